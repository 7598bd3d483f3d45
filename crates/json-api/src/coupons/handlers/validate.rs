//! Validate Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    coupons::{
        errors::{into_validation_error, validation_outcome},
        models::{ValidateCouponRequest, ValidateCouponResponse},
    },
    extensions::*,
    observability::record_coupon_validation,
    state::State,
};

/// Validate Coupon Handler
///
/// Checks a customer-entered code against the cart. A coupon that exists and is usable
/// but covers nothing in the cart is still returned, with `isApplicable: false`.
#[endpoint(
    tags("coupons"),
    summary = "Validate Coupon Code",
    responses(
        (status_code = StatusCode::OK, description = "Coupon is usable"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing code, or coupon inactive or expired"),
        (status_code = StatusCode::NOT_FOUND, description = "Invalid coupon code"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.validate",
    skip(json, depot),
    fields(code = tracing::field::Empty, lines = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<ValidateCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<ValidateCouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let code = request.code.unwrap_or_default();

    let span = tracing::Span::current();

    span.record("code", code.as_str());
    span.record("lines", request.items.len());

    let result = state
        .app
        .coupons
        .validate_coupon(
            code,
            request.items.into_iter().map(Into::into).collect(),
            Timestamp::now(),
        )
        .await;

    match result {
        Ok(validation) => {
            record_coupon_validation(if validation.applicability.is_applicable {
                "applicable"
            } else {
                "not_applicable"
            });

            Ok(Json(validation.into()))
        }
        Err(error) => {
            record_coupon_validation(validation_outcome(&error));

            Err(into_validation_error(error))
        }
    }
}
