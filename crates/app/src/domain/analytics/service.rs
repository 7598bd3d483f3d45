//! Analytics Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::analytics::{
        AnalyticsServiceError,
        data::{NewCartAdd, NewProductView, ReportWindows, TOP_PRODUCTS_LIMIT},
        records::AnalyticsSummary,
        repository::PgAnalyticsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgAnalyticsService {
    db: Db,
    repository: PgAnalyticsRepository,
}

impl PgAnalyticsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAnalyticsRepository::new(),
        }
    }
}

fn normalise_token(token: Option<String>) -> Option<String> {
    token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl AnalyticsService for PgAnalyticsService {
    #[tracing::instrument(
        name = "analytics.service.record_product_view",
        skip(self, view),
        fields(product_uuid = %view.product_uuid),
        err
    )]
    async fn record_product_view(&self, view: NewProductView) -> Result<(), AnalyticsServiceError> {
        let view = NewProductView {
            visitor_token: normalise_token(view.visitor_token),
            ..view
        };

        let mut tx = self.db.begin().await?;

        self.repository.record_product_view(&mut tx, view).await?;

        tx.commit().await?;

        debug!("recorded product view");

        Ok(())
    }

    #[tracing::instrument(
        name = "analytics.service.record_cart_add",
        skip(self, cart_add),
        fields(product_uuid = %cart_add.product_uuid, quantity = cart_add.quantity),
        err
    )]
    async fn record_cart_add(&self, cart_add: NewCartAdd) -> Result<(), AnalyticsServiceError> {
        let cart_add = NewCartAdd {
            visitor_token: normalise_token(cart_add.visitor_token),
            ..cart_add
        };

        let mut tx = self.db.begin().await?;

        self.repository.record_cart_add(&mut tx, cart_add).await?;

        tx.commit().await?;

        debug!("recorded cart add");

        Ok(())
    }

    #[tracing::instrument(name = "analytics.service.summary", skip(self), err)]
    async fn analytics_summary(
        &self,
        now: Timestamp,
    ) -> Result<AnalyticsSummary, AnalyticsServiceError> {
        let windows = ReportWindows::ending_at(now).map_err(AnalyticsServiceError::Window)?;

        let mut tx = self.db.begin().await?;

        let summary = AnalyticsSummary {
            visitors: self.repository.visitor_stats(&mut tx, windows).await?,
            most_viewed: self
                .repository
                .most_viewed_products(&mut tx, TOP_PRODUCTS_LIMIT)
                .await?,
            most_cart_added: self
                .repository
                .most_cart_added_products(&mut tx, TOP_PRODUCTS_LIMIT)
                .await?,
            most_checked_out: self
                .repository
                .most_checked_out_products(&mut tx, TOP_PRODUCTS_LIMIT)
                .await?,
        };

        tx.commit().await?;

        info!(visitors = summary.visitors.total, "built analytics summary");

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Record a product page view.
    async fn record_product_view(&self, view: NewProductView) -> Result<(), AnalyticsServiceError>;

    /// Record a product being added to a cart.
    async fn record_cart_add(&self, cart_add: NewCartAdd) -> Result<(), AnalyticsServiceError>;

    /// Visitor counts and the top viewed, carted and ordered products as of `now`.
    async fn analytics_summary(
        &self,
        now: Timestamp,
    ) -> Result<AnalyticsSummary, AnalyticsServiceError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        domain::{
            analytics::records::EventUuid,
            catalog::records::ProductUuid,
            orders::{
                OrdersService,
                data::{NewOrder, NewOrderItem},
                records::OrderUuid,
            },
            sessions::{
                SessionsService,
                data::NewSession,
                records::SessionUuid,
            },
            visitors::VisitorsService,
        },
        test::{TestContext, helpers},
    };

    use super::*;

    fn view(product_uuid: ProductUuid, visitor_token: Option<&str>) -> NewProductView {
        NewProductView {
            uuid: EventUuid::new(),
            product_uuid,
            visitor_token: visitor_token.map(ToString::to_string),
        }
    }

    fn cart_add(product_uuid: ProductUuid, quantity: u32) -> NewCartAdd {
        NewCartAdd {
            uuid: EventUuid::new(),
            product_uuid,
            visitor_token: None,
            quantity,
        }
    }

    async fn open_session(ctx: &TestContext, visitor_token: &str) -> TestResult {
        ctx.sessions
            .create_session(NewSession {
                uuid: SessionUuid::new(),
                visitor_token: visitor_token.to_string(),
                cart_items: json!([]),
                subtotal: 0,
                applied_coupons: None,
                discount_amount: 0,
            })
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn empty_store_has_an_empty_summary() -> TestResult {
        let ctx = TestContext::new().await;

        let summary = ctx.analytics.analytics_summary(Timestamp::now()).await?;

        assert_eq!(summary, AnalyticsSummary::default());

        Ok(())
    }

    #[tokio::test]
    async fn visitors_are_split_by_session_count() -> TestResult {
        let ctx = TestContext::new().await;

        let once = ctx.visitors.get_or_create(None).await?.visitor;
        let twice = ctx.visitors.get_or_create(None).await?.visitor;
        ctx.visitors.get_or_create(None).await?;

        open_session(&ctx, &once.token).await?;
        open_session(&ctx, &twice.token).await?;
        open_session(&ctx, &twice.token).await?;

        let stats = ctx.analytics.analytics_summary(Timestamp::now()).await?.visitors;

        assert_eq!(stats.unique, 1);
        assert_eq!(stats.repeat, 1);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.today, 3);
        assert_eq!(stats.week, 3);
        assert_eq!(stats.month, 3);

        Ok(())
    }

    #[tokio::test]
    async fn views_are_ranked_and_unknown_tokens_are_anonymous() -> TestResult {
        let ctx = TestContext::new().await;
        let rice = helpers::create_product(&ctx, "Basmati Rice", 12_000).await?;
        let ghee = helpers::create_product(&ctx, "Ghee", 90_000).await?;
        let visitor = ctx.visitors.get_or_create(None).await?.visitor;

        ctx.analytics
            .record_product_view(view(ghee.uuid, Some(&visitor.token)))
            .await?;
        ctx.analytics
            .record_product_view(view(ghee.uuid, Some("Visitor-404")))
            .await?;
        ctx.analytics.record_product_view(view(rice.uuid, None)).await?;

        let most_viewed = ctx.analytics.analytics_summary(Timestamp::now()).await?.most_viewed;
        let ranking: Vec<(&str, u64)> = most_viewed
            .iter()
            .map(|product| (product.name.as_str(), product.views))
            .collect();

        assert_eq!(ranking, vec![("Ghee", 2), ("Basmati Rice", 1)]);

        Ok(())
    }

    #[tokio::test]
    async fn cart_adds_sum_quantities() -> TestResult {
        let ctx = TestContext::new().await;
        let lentils = helpers::create_product(&ctx, "Lentils", 15_000).await?;

        ctx.analytics.record_cart_add(cart_add(lentils.uuid, 2)).await?;
        ctx.analytics.record_cart_add(cart_add(lentils.uuid, 3)).await?;

        let summary = ctx.analytics.analytics_summary(Timestamp::now()).await?;
        let top = summary.most_cart_added.first();

        assert_eq!(top.map(|product| (product.adds, product.quantity)), Some((2, 5)));

        Ok(())
    }

    #[tokio::test]
    async fn checkouts_count_orders_and_units() -> TestResult {
        let ctx = TestContext::new().await;
        let rice = helpers::create_product(&ctx, "Basmati Rice", 12_000).await?;
        let variety = rice.varieties.first().map(|variety| variety.uuid);

        ctx.orders
            .place_order(NewOrder {
                uuid: OrderUuid::new(),
                customer_name: "Rahim Uddin".to_string(),
                customer_phone: "01711000000".to_string(),
                customer_email: None,
                customer_address: "House 4, Road 2, Dhanmondi".to_string(),
                items: vec![NewOrderItem {
                    product_uuid: Some(rice.uuid),
                    variety_uuid: variety,
                    name: rice.name.clone(),
                    variety_name: Some("1kg".to_string()),
                    price: 12_000,
                    quantity: 2,
                }],
                coupon_codes: Vec::new(),
                claimed_total: 30_000,
                session_uuid: None,
            })
            .await?;

        let summary = ctx.analytics.analytics_summary(Timestamp::now()).await?;
        let top = summary.most_checked_out.first();

        assert_eq!(top.map(|product| product.product_uuid), Some(rice.uuid));
        assert_eq!(top.map(|product| (product.orders, product.quantity)), Some((1, 2)));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_an_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .analytics
            .record_product_view(view(ProductUuid::new(), None))
            .await;

        assert!(
            matches!(result, Err(AnalyticsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn zero_quantity_cart_add_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;
        let lentils = helpers::create_product(&ctx, "Lentils", 15_000).await?;

        let result = ctx.analytics.record_cart_add(cart_add(lentils.uuid, 0)).await;

        assert!(
            matches!(result, Err(AnalyticsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }
}
