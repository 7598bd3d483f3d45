//! Create Coupon Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    coupons::{
        errors::into_status_error,
        models::{CouponResponse, CreateCouponRequest},
    },
    extensions::*,
    state::State,
};

/// Create Coupon Handler
#[endpoint(
    tags("admin"),
    summary = "Create Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.create",
    skip(json, depot, res),
    fields(coupon_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let coupon = json.into_inner().into_new_coupon()?;

    let coupon = state
        .app
        .coupons
        .create_coupon(coupon)
        .await
        .map_err(into_status_error)?;

    tracing::Span::current().record("coupon_uuid", tracing::field::display(coupon.uuid));

    res.add_header(LOCATION, format!("/admin/coupons/{}", coupon.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(coupon.into()))
}
