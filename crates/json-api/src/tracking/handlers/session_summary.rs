//! Checkout Session Summary Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    tracking::{errors::session_status_error, models::SessionSummaryResponse},
};

/// Session Summary Handler
///
/// Session counts per state.
#[endpoint(
    tags("admin"),
    summary = "Checkout Session Summary",
    responses(
        (status_code = StatusCode::OK, description = "Counts per state"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<SessionSummaryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let summary = state
        .app
        .sessions
        .session_summary()
        .await
        .map_err(session_status_error)?;

    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::sessions::records::SessionSummary;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::Mocks;

    use super::*;

    #[tokio::test]
    async fn test_summary_counts() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.sessions.expect_session_summary().once().return_once(|| {
            Ok(SessionSummary {
                total: 10,
                active: 2,
                completed: 5,
                abandoned: 3,
            })
        });

        let response: SessionSummaryResponse =
            TestClient::get("http://example.com/admin/sessions/summary")
                .send(&mocks.into_service(Router::with_path("admin/sessions/summary").get(handler)))
                .await
                .take_json()
                .await?;

        assert_eq!(response.total, 10);
        assert_eq!(response.abandoned, 3);

        Ok(())
    }
}
