//! Place Order Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use grocer_app::domain::orders::data::NewOrder;

use crate::{
    extensions::*,
    observability::record_order_placed,
    orders::{
        errors::into_status_error,
        models::{CreateOrderRequest, OrderResponse},
    },
    state::State,
};

/// Place Order Handler
///
/// Items are repriced from the catalog. A total that drifts from the server's
/// by more than the configured tolerance is refused with 409.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::CONFLICT, description = "Prices or total changed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.place",
    skip(json, depot, res),
    fields(order_uuid = tracing::field::Empty, invoice = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order: NewOrder = json.into_inner().into();

    let order = state
        .app
        .orders
        .place_order(order)
        .await
        .map_err(into_status_error)?;

    let span = tracing::Span::current();
    span.record("order_uuid", tracing::field::display(order.uuid));
    span.record("invoice", order.invoice.as_str());

    record_order_placed();

    res.add_header(LOCATION, format!("/admin/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
