//! Get Checkout Session Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    tracking::{errors::session_status_error, models::SessionResponse},
};

/// Get Session Handler
#[endpoint(
    tags("tracking"),
    summary = "Get Checkout Session",
    responses(
        (status_code = StatusCode::OK, description = "Session"),
        (status_code = StatusCode::NOT_FOUND, description = "Session not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let session = state
        .app
        .sessions
        .get_session(session.into_inner().into())
        .await
        .map_err(session_status_error)?;

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::sessions::{SessionsServiceError, records::SessionUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{test_helpers::Mocks, tracking::models::tests::make_session};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("tracking/sessions/{session}").get(handler))
    }

    #[tokio::test]
    async fn test_get_session_success() -> TestResult {
        let uuid = SessionUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_get_session()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(make_session(uuid)));

        let body: SessionResponse =
            TestClient::get(format!("http://example.com/tracking/sessions/{uuid}"))
                .send(&make_service(mocks))
                .await
                .take_json()
                .await?;

        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.subtotal, 45_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_session_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_get_session()
            .once()
            .return_once(|_| Err(SessionsServiceError::NotFound));

        let res = TestClient::get(format!(
            "http://example.com/tracking/sessions/{}",
            Uuid::now_v7()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
