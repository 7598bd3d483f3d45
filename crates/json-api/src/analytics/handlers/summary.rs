//! Analytics Summary Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    analytics::{errors::into_status_error, models::AnalyticsResponse},
    extensions::*,
    state::State,
};

/// Analytics Summary Handler
///
/// Visitor counts for today, the last seven days and the last month, plus the ten most
/// viewed, most carted and most ordered products.
#[endpoint(
    tags("admin"),
    summary = "Analytics Summary",
    responses(
        (status_code = StatusCode::OK, description = "Dashboard figures"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<AnalyticsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let summary = state
        .app
        .analytics
        .analytics_summary(Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
