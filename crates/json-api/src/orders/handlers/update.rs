//! Update Order Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{
        errors::into_status_error,
        models::{OrderResponse, UpdateOrderRequest},
    },
    state::State,
};

/// Update Order Handler
///
/// Moving to `approved` or `delivered` stamps the matching timestamp once.
#[endpoint(
    tags("admin"),
    summary = "Update Order",
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.update",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner();
    let update = json.into_inner().into_update()?;

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let order = state
        .app
        .orders
        .update_order(order.into(), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::orders::{
        data::OrderUpdate,
        records::{OrderStatus, OrderUuid},
    };
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{orders::models::tests::make_order, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/orders/{order}").put(handler))
    }

    #[tokio::test]
    async fn test_approve_with_note() -> TestResult {
        let uuid = OrderUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_update_order()
            .once()
            .withf(move |requested, update| {
                *requested == uuid
                    && *update
                        == OrderUpdate {
                            status: Some(OrderStatus::Approved),
                            admin_note: Some("Call before delivery".to_string()),
                            ..OrderUpdate::default()
                        }
            })
            .return_once(move |_, _| {
                let mut order = make_order(uuid);
                order.status = OrderStatus::Approved;
                order.admin_note = Some("Call before delivery".to_string());
                order.approved_at = Some(Timestamp::UNIX_EPOCH);
                Ok(order)
            });

        let mut res = TestClient::put(format!("http://example.com/admin/orders/{uuid}"))
            .json(&json!({ "status": "approved", "adminNote": "Call before delivery" }))
            .send(&make_service(mocks))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "approved");
        assert!(body.approved_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() {
        let mut mocks = Mocks::default();

        mocks.orders.expect_update_order().never();

        let res = TestClient::put(format!("http://example.com/admin/orders/{}", Uuid::now_v7()))
            .json(&json!({ "status": "shipped" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
