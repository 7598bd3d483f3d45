//! List Checkout Sessions Handler

use std::sync::Arc;

use grocer::sessions::SessionState;
use salvo::{oapi::extract::QueryParam, prelude::*};

use grocer_app::domain::sessions::data::{MAX_SESSION_LIST, SessionFilter};

use crate::{
    extensions::*,
    state::State,
    tracking::{
        errors::session_status_error,
        models::{SessionResponse, SessionsResponse},
    },
};

/// List Sessions Handler
///
/// Newest first, optionally filtered by `state` and visitor token.
#[endpoint(
    tags("admin"),
    summary = "List Checkout Sessions",
    responses(
        (status_code = StatusCode::OK, description = "Sessions"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown state filter"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    state: QueryParam<String, false>,
    visitor: QueryParam<String, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<SessionsResponse>, StatusError> {
    let shared = depot.obtain_or_500::<Arc<State>>()?;

    let filter = SessionFilter {
        state: state
            .into_inner()
            .filter(|state| !state.is_empty())
            .map(|state| state.parse::<SessionState>())
            .transpose()
            .or_400("Invalid session state")?,
        visitor_token: visitor.into_inner().filter(|token| !token.trim().is_empty()),
        limit: limit.into_inner().unwrap_or(MAX_SESSION_LIST),
    };

    let sessions = shared
        .app
        .sessions
        .list_sessions(filter)
        .await
        .map_err(session_status_error)?;

    Ok(Json(SessionsResponse {
        sessions: sessions.into_iter().map(SessionResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::sessions::records::SessionUuid;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{test_helpers::Mocks, tracking::models::tests::make_session};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/sessions").get(handler))
    }

    #[tokio::test]
    async fn test_list_forwards_state_and_visitor_filters() -> TestResult {
        let uuid = SessionUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_list_sessions()
            .once()
            .withf(|filter| {
                *filter
                    == SessionFilter {
                        state: Some(SessionState::Abandoned),
                        visitor_token: Some("Visitor-7".to_string()),
                        limit: MAX_SESSION_LIST,
                    }
            })
            .return_once(move |_| Ok(vec![make_session(uuid)]));

        let response: SessionsResponse =
            TestClient::get("http://example.com/admin/sessions?state=abandoned&visitor=Visitor-7")
                .send(&make_service(mocks))
                .await
                .take_json()
                .await?;

        assert_eq!(
            response.sessions.first().map(|session| session.uuid),
            Some(uuid.into_uuid())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_state_returns_400() {
        let mut mocks = Mocks::default();

        mocks.sessions.expect_list_sessions().never();

        let res = TestClient::get("http://example.com/admin/sessions?state=paused")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
