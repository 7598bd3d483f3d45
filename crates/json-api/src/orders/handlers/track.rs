//! Track Orders Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// Track Orders Handler
///
/// The customer's recent orders, matched on phone number.
#[endpoint(
    tags("orders"),
    summary = "Track Orders By Phone",
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Phone number is required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    phone: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let orders = state
        .app
        .orders
        .track_orders_by_phone(phone.into_inner().unwrap_or_default())
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}
