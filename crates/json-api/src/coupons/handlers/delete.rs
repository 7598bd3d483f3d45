//! Delete Coupon Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{coupons::errors::into_status_error, extensions::*, state::State};

/// Delete Coupon Handler
///
/// Orders keep the code and discount they were placed with.
#[endpoint(
    tags("admin"),
    summary = "Delete Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .coupons
        .delete_coupon(coupon.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::OK)
}
