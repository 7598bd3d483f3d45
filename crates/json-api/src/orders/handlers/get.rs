//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Get Order Handler
#[endpoint(
    tags("admin"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let order = state
        .app
        .orders
        .get_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::orders::{OrdersServiceError, records::OrderUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{orders::models::tests::make_order, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/orders/{order}").get(handler))
    }

    #[tokio::test]
    async fn test_get_order_with_items_and_coupons() -> TestResult {
        let uuid = OrderUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_get_order()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(make_order(uuid)));

        let body: OrderResponse = TestClient::get(format!("http://example.com/admin/orders/{uuid}"))
            .send(&make_service(mocks))
            .await
            .take_json()
            .await?;

        assert_eq!(body.status, "pending");
        assert_eq!(
            body.items.first().map(|item| item.product_name.as_str()),
            Some("Miniket Rice")
        );
        assert_eq!(body.coupons.first().map(|coupon| coupon.discount), Some(8_100));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_order_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_get_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/admin/orders/{}", Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
