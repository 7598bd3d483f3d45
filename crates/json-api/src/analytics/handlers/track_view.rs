//! Track Product View Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    analytics::{
        errors::into_status_error,
        models::{TrackViewRequest, TrackedResponse},
    },
    extensions::*,
    observability::record_storefront_event,
    state::State,
};

/// Track Product View Handler
#[endpoint(
    tags("analytics"),
    summary = "Track Product View",
    responses(
        (status_code = StatusCode::OK, description = "View recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown product"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<TrackViewRequest>,
    depot: &mut Depot,
) -> Result<Json<TrackedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .analytics
        .record_product_view(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    record_storefront_event("product_view");

    Ok(Json(TrackedResponse { success: true }))
}
