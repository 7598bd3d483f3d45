//! Send Order To Courier Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::CourierHandoffResponse},
    state::State,
};

/// Send Order To Courier Handler
///
/// Only approved orders without a consignment can be handed over.
#[endpoint(
    tags("admin"),
    summary = "Send Order To Courier",
    responses(
        (status_code = StatusCode::OK, description = "Consignment created"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order not approved or already sent"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Courier request failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.send_to_courier",
    skip(order, depot),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CourierHandoffResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner();

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let handoff = state
        .app
        .orders
        .send_to_courier(order.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(handoff.into()))
}
