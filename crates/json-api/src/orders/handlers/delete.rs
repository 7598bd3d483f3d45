//! Delete Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Delete Order Handler
#[endpoint(
    tags("admin"),
    summary = "Delete Order",
    responses(
        (status_code = StatusCode::OK, description = "Order deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .orders
        .delete_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::OK)
}
