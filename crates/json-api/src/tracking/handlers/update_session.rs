//! Update Checkout Session Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    tracking::{
        errors::session_status_error,
        models::{SessionResponse, UpdateSessionRequest},
    },
};

/// Update Session Handler
///
/// Writes only the fields present in the body. Sessions that already completed or
/// ended reject updates with `409`.
#[endpoint(
    tags("tracking"),
    summary = "Update Checkout Session",
    responses(
        (status_code = StatusCode::OK, description = "Session updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Session not found"),
        (status_code = StatusCode::CONFLICT, description = "Session already terminated"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    json: JsonBody<UpdateSessionRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let session = state
        .app
        .sessions
        .update_session(session.into_inner().into(), json.into_inner().into())
        .await
        .map_err(session_status_error)?;

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use grocer::sessions::SessionState;
    use grocer_app::domain::sessions::{
        SessionsServiceError, data::SessionUpdate, records::SessionUuid,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{test_helpers::Mocks, tracking::models::tests::make_session};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("tracking/sessions/{session}").put(handler))
    }

    #[tokio::test]
    async fn test_patch_forwards_only_present_fields() -> TestResult {
        let uuid = SessionUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_update_session()
            .once()
            .withf(move |requested, update| {
                *requested == uuid
                    && *update
                        == SessionUpdate {
                            customer_phone: Some("01711000000".to_string()),
                            discount_amount: Some(4_500),
                            ..SessionUpdate::default()
                        }
            })
            .return_once(move |_, _| Ok(make_session(uuid)));

        let res = TestClient::put(format!("http://example.com/tracking/sessions/{uuid}"))
            .json(&json!({ "customerPhone": "01711000000", "discountAmount": 4500 }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_patch_after_terminal_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_update_session()
            .once()
            .return_once(|_, _| {
                Err(SessionsServiceError::AlreadyTerminated(SessionState::Abandoned))
            });

        let mut res = TestClient::put(format!(
            "http://example.com/tracking/sessions/{}",
            Uuid::now_v7()
        ))
        .json(&json!({ "subtotal": 100 }))
        .send(&make_service(mocks))
        .await;

        let body = res.take_string().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert!(body.contains("abandoned"), "unexpected body {body}");

        Ok(())
    }
}
