//! List Orders Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use grocer_app::domain::orders::data::OrderFilter;

use crate::{
    extensions::*,
    orders::{
        errors::into_status_error,
        models::{OrdersResponse, parse_status},
    },
    state::State,
};

/// List Orders Handler
///
/// Newest first. `search` matches invoice, customer name or phone.
#[endpoint(
    tags("admin"),
    summary = "List Orders",
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status filter"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    search: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let filter = OrderFilter {
        status: status
            .into_inner()
            .filter(|status| !status.is_empty() && status != "all")
            .as_deref()
            .map(parse_status)
            .transpose()?,
        search: search
            .into_inner()
            .map(|search| search.trim().to_string())
            .filter(|search| !search.is_empty()),
    };

    let orders = state
        .app
        .orders
        .list_orders(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::orders::records::{OrderStatus, OrderUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{orders::models::tests::make_order, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/orders").get(handler))
    }

    #[tokio::test]
    async fn test_list_forwards_status_and_search() -> TestResult {
        let uuid = OrderUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_list_orders()
            .once()
            .withf(|filter| {
                *filter
                    == OrderFilter {
                        status: Some(OrderStatus::Pending),
                        search: Some("INV-2026".to_string()),
                    }
            })
            .return_once(move |_| Ok(vec![make_order(uuid)]));

        let response: OrdersResponse =
            TestClient::get("http://example.com/admin/orders?status=pending&search=%20INV-2026")
                .send(&make_service(mocks))
                .await
                .take_json()
                .await?;

        assert_eq!(response.orders.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_all_status_lists_everything() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_list_orders()
            .once()
            .withf(|filter| *filter == OrderFilter::default())
            .return_once(|_| Ok(Vec::new()));

        let response: OrdersResponse = TestClient::get("http://example.com/admin/orders?status=all")
            .send(&make_service(mocks))
            .await
            .take_json()
            .await?;

        assert!(response.orders.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() {
        let mut mocks = Mocks::default();

        mocks.orders.expect_list_orders().never();

        let res = TestClient::get("http://example.com/admin/orders?status=shipped")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
