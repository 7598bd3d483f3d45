//! Terminate Checkout Session Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use grocer_app::domain::sessions::data::TerminalUpdate;

use crate::{
    extensions::*,
    observability::record_session_terminal,
    state::State,
    tracking::{
        errors::session_status_error,
        models::{SessionResponse, TerminalSessionRequest},
    },
};

/// Terminate Session Handler
///
/// `complete` records a placed order, `end` records the customer leaving. Only one
/// terminal transition is accepted per session.
#[endpoint(
    tags("tracking"),
    summary = "Complete or End Checkout Session",
    responses(
        (status_code = StatusCode::OK, description = "Session terminated"),
        (status_code = StatusCode::NOT_FOUND, description = "Session not found"),
        (status_code = StatusCode::CONFLICT, description = "Session already terminated"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "sessions.terminate",
    skip(session, json, depot),
    fields(session_uuid = tracing::field::Empty, action = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    json: JsonBody<TerminalSessionRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = session.into_inner();
    let terminal: TerminalUpdate = json.into_inner().into();

    let span = tracing::Span::current();

    span.record("session_uuid", tracing::field::display(session));
    span.record("action", terminal.action.as_str());

    let action = terminal.action;

    let session = state
        .app
        .sessions
        .terminate_session(session.into(), terminal, Timestamp::now())
        .await
        .map_err(session_status_error)?;

    record_session_terminal(action.as_str());

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use grocer::sessions::{SessionState, TerminalAction};
    use grocer_app::domain::sessions::{SessionsServiceError, records::SessionUuid};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{test_helpers::Mocks, tracking::models::tests::make_session};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(
            Router::with_path("tracking/sessions/{session}/terminal").put(handler),
        )
    }

    #[tokio::test]
    async fn test_complete_session() -> TestResult {
        let uuid = SessionUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_terminate_session()
            .once()
            .withf(move |requested, terminal, _| {
                *requested == uuid
                    && terminal.action == TerminalAction::Complete
                    && terminal.customer.address.as_deref() == Some("Banani 11")
            })
            .return_once(move |_, _, now| {
                let mut session = make_session(uuid);
                session.exit_time = Some(now);
                session.order_completed = true;
                session.time_spent = Some(95);
                Ok(session)
            });

        let mut res = TestClient::put(format!(
            "http://example.com/tracking/sessions/{uuid}/terminal"
        ))
        .json(&json!({
            "action": "complete",
            "customerName": "Farhana",
            "customerPhone": "01555000111",
            "customerAddress": "Banani 11"
        }))
        .send(&make_service(mocks))
        .await;

        let body: SessionResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.state, SessionState::Completed.as_str());
        assert!(body.time_spent.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_second_terminal_call_returns_409() {
        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_terminate_session()
            .once()
            .return_once(|_, _, _| {
                Err(SessionsServiceError::AlreadyTerminated(SessionState::Completed))
            });

        let res = TestClient::put(format!(
            "http://example.com/tracking/sessions/{}/terminal",
            Uuid::now_v7()
        ))
        .json(&json!({ "action": "end" }))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_unknown_action_never_reaches_service() {
        let mut mocks = Mocks::default();

        mocks.sessions.expect_terminate_session().never();

        let res = TestClient::put(format!(
            "http://example.com/tracking/sessions/{}/terminal",
            Uuid::now_v7()
        ))
        .json(&json!({ "action": "pause" }))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
