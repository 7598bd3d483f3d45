//! Track Cart Add Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    analytics::{
        errors::into_status_error,
        models::{TrackCartRequest, TrackedResponse},
    },
    extensions::*,
    observability::record_storefront_event,
    state::State,
};

/// Track Cart Add Handler
///
/// `quantity` defaults to 1.
#[endpoint(
    tags("analytics"),
    summary = "Track Cart Add",
    responses(
        (status_code = StatusCode::OK, description = "Cart add recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown product or zero quantity"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<TrackCartRequest>,
    depot: &mut Depot,
) -> Result<Json<TrackedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .analytics
        .record_cart_add(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    record_storefront_event("cart_add");

    Ok(Json(TrackedResponse { success: true }))
}
