//! Get Coupon Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
    state::State,
};

/// Get Coupon Handler
#[endpoint(
    tags("admin"),
    summary = "Get Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let coupon = state
        .app
        .coupons
        .get_coupon(coupon.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(coupon.into()))
}

#[cfg(test)]
mod tests {
    use grocer::coupons::CouponScope;
    use grocer_app::domain::coupons::{CouponsServiceError, records::CouponUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{coupons::models::tests::make_coupon, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/coupons/{coupon}").get(handler))
    }

    #[tokio::test]
    async fn test_get_coupon_success() -> TestResult {
        let uuid = CouponUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .coupons
            .expect_get_coupon()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(make_coupon(uuid, CouponScope::All)));

        let mut res = TestClient::get(format!("http://example.com/admin/coupons/{uuid}"))
            .send(&make_service(mocks))
            .await;

        let body: CouponResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.code, "SAVE10");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_coupon_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .coupons
            .expect_get_coupon()
            .once()
            .return_once(|_| Err(CouponsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/admin/coupons/{}", Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
