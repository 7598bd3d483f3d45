//! List Coupons Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    coupons::{
        errors::into_status_error,
        models::{CouponResponse, CouponsResponse},
    },
    extensions::*,
    state::State,
};

/// List Coupons Handler
///
/// Newest first. `?active=true` restricts the list to active coupons.
#[endpoint(
    tags("admin"),
    summary = "List Coupons",
    responses(
        (status_code = StatusCode::OK, description = "Coupons"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    active: QueryParam<bool, false>,
    depot: &mut Depot,
) -> Result<Json<CouponsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let coupons = state
        .app
        .coupons
        .list_coupons(active.into_inner().unwrap_or(false))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CouponsResponse {
        coupons: coupons.into_iter().map(CouponResponse::from).collect(),
    }))
}
