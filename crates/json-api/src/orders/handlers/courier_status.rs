//! Courier Status Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::CourierTrackingResponse},
    state::State,
};

/// Courier Status Handler
///
/// Polls the courier and folds the delivery status into the order.
#[endpoint(
    tags("admin"),
    summary = "Refresh Courier Status",
    responses(
        (status_code = StatusCode::OK, description = "Delivery status"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order has not been sent to courier"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Courier request failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CourierTrackingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let tracking = state
        .app
        .orders
        .refresh_courier_status(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(tracking.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::{
        courier::CourierError,
        orders::{
            OrdersServiceError,
            records::{CourierTracking, OrderStatus, OrderUuid},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{orders::models::tests::make_order, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/orders/{order}/courier").get(handler))
    }

    #[tokio::test]
    async fn test_delivered_status_is_reported() -> TestResult {
        let uuid = OrderUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_refresh_courier_status()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| {
                let mut order = make_order(uuid);
                order.status = OrderStatus::Delivered;
                order.courier_status = Some("delivered".to_string());

                Ok(CourierTracking {
                    order,
                    delivery_status: "delivered".to_string(),
                })
            });

        let body: CourierTrackingResponse =
            TestClient::get(format!("http://example.com/admin/orders/{uuid}/courier"))
                .send(&make_service(mocks))
                .await
                .take_json()
                .await?;

        assert_eq!(body.delivery_status, "delivered");
        assert_eq!(body.order.status, "delivered");

        Ok(())
    }

    #[tokio::test]
    async fn test_unsent_order_returns_409() {
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_refresh_courier_status()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotSentToCourier));

        let res = TestClient::get(format!(
            "http://example.com/admin/orders/{}/courier",
            Uuid::now_v7()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_courier_outage_returns_502() {
        let mut mocks = Mocks::default();

        mocks.orders.expect_refresh_courier_status().once().return_once(|_| {
            Err(OrdersServiceError::Courier(CourierError::UnexpectedResponse(
                "status 503".to_string(),
            )))
        });

        let res = TestClient::get(format!(
            "http://example.com/admin/orders/{}/courier",
            Uuid::now_v7()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));
    }
}
