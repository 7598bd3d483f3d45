//! App Router

use salvo::prelude::*;

use crate::{analytics, catalog, coupons, healthcheck, orders, settings, tracking, webhooks};

/// Storefront and admin routes, without middleware or state.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(storefront())
        .push(Router::with_path("admin").push(admin()))
}

fn storefront() -> Router {
    use crate::catalog::handlers as catalog;
    use crate::orders::handlers as orders;
    use crate::tracking::handlers as tracking;

    Router::new()
        .push(Router::with_path("settings").get(settings::handlers::get::handler))
        .push(
            Router::with_path("products")
                .get(catalog::list_products::handler)
                .push(Router::with_path("{product}").get(catalog::get_product::handler)),
        )
        .push(
            Router::with_path("categories")
                .get(catalog::list_categories::handler)
                .push(Router::with_path("{category}").get(catalog::get_category::handler)),
        )
        .push(Router::with_path("coupons/validate").post(coupons::handlers::validate::handler))
        .push(
            Router::with_path("tracking")
                .push(Router::with_path("visitors").post(tracking::visitors::handler))
                .push(
                    Router::with_path("sessions")
                        .post(tracking::create_session::handler)
                        .push(
                            Router::with_path("{session}")
                                .get(tracking::get_session::handler)
                                .put(tracking::update_session::handler)
                                .push(
                                    Router::with_path("terminal")
                                        .put(tracking::terminate_session::handler),
                                )
                                .push(Router::with_path("beacon").post(tracking::beacon::handler)),
                        ),
                ),
        )
        .push(
            Router::with_path("analytics")
                .push(Router::with_path("views").post(analytics::handlers::track_view::handler))
                .push(Router::with_path("cart").post(analytics::handlers::track_cart::handler)),
        )
        .push(
            Router::with_path("orders")
                .post(orders::create::handler)
                .push(Router::with_path("track").get(orders::track::handler)),
        )
        .push(
            Router::with_path("webhooks/courier")
                .get(webhooks::courier::liveness)
                .post(webhooks::courier::receive),
        )
}

fn admin() -> Router {
    use crate::coupons::handlers as coupons;
    use crate::orders::handlers as orders;

    Router::new()
        .push(Router::with_path("categories").post(catalog::handlers::create_category::handler))
        .push(Router::with_path("products").post(catalog::handlers::create_product::handler))
        .push(
            Router::with_path("coupons")
                .get(coupons::index::handler)
                .post(coupons::create::handler)
                .push(
                    Router::with_path("{coupon}")
                        .get(coupons::get::handler)
                        .put(coupons::update::handler)
                        .delete(coupons::delete::handler),
                ),
        )
        .push(Router::with_path("settings").put(settings::handlers::update::handler))
        .push(Router::with_path("analytics").get(analytics::handlers::summary::handler))
        .push(
            Router::with_path("sessions")
                .get(tracking::handlers::list_sessions::handler)
                .push(
                    Router::with_path("summary").get(tracking::handlers::session_summary::handler),
                ),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .put(orders::update::handler)
                        .delete(orders::delete::handler)
                        .push(
                            Router::with_path("courier")
                                .get(orders::courier_status::handler)
                                .post(orders::send_to_courier::handler),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::orders::records::OrderUuid;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        catalog::models::ProductsResponse,
        orders::models::{OrderResponse, tests::make_order},
        settings::models::{SettingsResponse, tests::make_settings},
        test_helpers::Mocks,
    };

    use super::*;

    #[tokio::test]
    async fn storefront_settings_are_routed() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .settings
            .expect_get_settings()
            .once()
            .return_once(|| Ok(make_settings()));

        let body: SettingsResponse = TestClient::get("http://example.com/settings")
            .send(&mocks.into_service(app_router()))
            .await
            .take_json()
            .await?;

        assert_eq!(body.store_name, "Lumina Grocery");

        Ok(())
    }

    #[tokio::test]
    async fn admin_orders_are_nested_under_admin() -> TestResult {
        let uuid = OrderUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_get_order()
            .once()
            .return_once(move |_| Ok(make_order(uuid)));

        let body: OrderResponse = TestClient::get(format!("http://example.com/admin/orders/{uuid}"))
            .send(&mocks.into_service(app_router()))
            .await
            .take_json()
            .await?;

        assert_eq!(body.uuid, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn storefront_product_listing_is_routed_beside_detail() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_list_products()
            .once()
            .withf(Option::is_none)
            .return_once(|_| Ok(Vec::new()));

        let body: ProductsResponse = TestClient::get("http://example.com/products")
            .send(&mocks.into_service(app_router()))
            .await
            .take_json()
            .await?;

        assert!(body.products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unknown_paths_return_404() {
        let res = TestClient::get("http://example.com/admin/unknown")
            .send(&Mocks::default().into_service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
