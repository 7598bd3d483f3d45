//! Coupons Service

use async_trait::async_trait;
use grocer::{
    cart::CartLine,
    coupons::{CouponScope, normalise_code, resolve_applicability},
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        catalog::repositories::{categories::PgCategoriesRepository, products::PgProductsRepository},
        coupons::{
            CouponsServiceError,
            data::{CouponUpdate, NewCoupon},
            records::{CouponRecord, CouponUuid, CouponValidation},
            repository::{CouponValues, PgCouponsRepository},
        },
        settings::repository::PgSettingsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    coupons: PgCouponsRepository,
    categories: PgCategoriesRepository,
    products: PgProductsRepository,
    settings: PgSettingsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            coupons: PgCouponsRepository::new(),
            categories: PgCategoriesRepository::new(),
            products: PgProductsRepository::new(),
            settings: PgSettingsRepository::new(),
        }
    }
}

/// Normalise the code and check the value range before anything is written.
fn prepare(values: CouponValues) -> Result<CouponValues, CouponsServiceError> {
    let code = normalise_code(&values.code);

    if code.is_empty() {
        return Err(CouponsServiceError::MissingCode);
    }

    if !values.discount.is_valid() {
        return Err(CouponsServiceError::InvalidValue);
    }

    Ok(CouponValues { code, ..values })
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid, scope = coupon.scope.as_str()),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        let uuid = coupon.uuid;
        let values = prepare(CouponValues::from(coupon))?;

        let mut tx = self.db.begin().await?;

        let record = self.coupons.create_coupon(&mut tx, uuid, values).await?;

        tx.commit().await?;

        info!(coupon_uuid = %record.uuid, code = %record.code, "created coupon");

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.update_coupon",
        skip(self, update),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn update_coupon(
        &self,
        coupon: CouponUuid,
        update: CouponUpdate,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self.coupons.get_coupon_for_update(&mut tx, coupon).await?;
        let current = CouponValues::from(&existing);

        let values = prepare(CouponValues {
            code: update.code.unwrap_or(current.code),
            discount: update.discount.unwrap_or(current.discount),
            scope: update.scope.unwrap_or(current.scope),
            is_active: update.is_active.unwrap_or(current.is_active),
            expires_at: update.expires_at.unwrap_or(current.expires_at),
        })?;

        let record = self.coupons.update_coupon(&mut tx, coupon, values).await?;

        tx.commit().await?;

        info!(coupon_uuid = %coupon, code = %record.code, "updated coupon");

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.delete_coupon",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn delete_coupon(&self, coupon: CouponUuid) -> Result<(), CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.coupons.delete_coupon(&mut tx, coupon).await?;

        if rows_affected == 0 {
            return Err(CouponsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(coupon_uuid = %coupon, "deleted coupon");

        Ok(())
    }

    #[tracing::instrument(
        name = "coupons.service.get_coupon",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.coupons.get_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(name = "coupons.service.list_coupons", skip(self), err)]
    async fn list_coupons(&self, active_only: bool) -> Result<Vec<CouponRecord>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.coupons.list_coupons(&mut tx, active_only).await?;

        tx.commit().await?;

        Ok(records)
    }

    #[tracing::instrument(
        name = "coupons.service.validate_coupon",
        skip(self, code, lines),
        fields(
            line_count = lines.len(),
            coupon_uuid = tracing::field::Empty,
            is_applicable = tracing::field::Empty
        ),
        err
    )]
    async fn validate_coupon(
        &self,
        code: String,
        lines: Vec<CartLine>,
        now: Timestamp,
    ) -> Result<CouponValidation, CouponsServiceError> {
        let code = normalise_code(&code);

        if code.is_empty() {
            return Err(CouponsServiceError::MissingCode);
        }

        let mut tx = self.db.begin().await?;

        let record = self
            .coupons
            .find_by_code(&mut tx, &code)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        let span = Span::current();

        span.record("coupon_uuid", tracing::field::display(record.uuid));

        let settings = self.settings.get_settings(&mut tx).await?;
        let currency = settings
            .store_currency()
            .ok_or(CouponsServiceError::UnknownCurrency(settings.currency))?;

        let coupon = record.to_coupon(currency)?;

        coupon.check_usable(now)?;

        let target_name = match coupon.scope {
            CouponScope::All => None,
            CouponScope::Category(category) => {
                self.categories.get_category_name(&mut tx, category).await?
            }
            CouponScope::Product(product) => {
                self.products.get_product_name(&mut tx, product).await?
            }
        };

        tx.commit().await?;

        let applicability = resolve_applicability(&coupon, &lines, target_name.as_deref());

        span.record(
            "is_applicable",
            tracing::field::display(applicability.is_applicable),
        );

        Ok(CouponValidation {
            coupon: record,
            applicability,
        })
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Create a coupon. The code is stored uppercase.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Merge the provided fields into a coupon.
    async fn update_coupon(
        &self,
        coupon: CouponUuid,
        update: CouponUpdate,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Permanently delete a coupon.
    async fn delete_coupon(&self, coupon: CouponUuid) -> Result<(), CouponsServiceError>;

    /// Retrieve a single coupon.
    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError>;

    /// Coupons newest first, optionally only active ones.
    async fn list_coupons(&self, active_only: bool) -> Result<Vec<CouponRecord>, CouponsServiceError>;

    /// Check a customer-entered code and resolve what it covers in the cart.
    async fn validate_coupon(
        &self,
        code: String,
        lines: Vec<CartLine>,
        now: Timestamp,
    ) -> Result<CouponValidation, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use grocer::ids::{CategoryUuid, ProductUuid};
    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::coupons::data::CouponDiscountData,
        test::{TestContext, helpers},
    };

    use super::*;

    fn ten_percent(scope: CouponScope) -> NewCoupon {
        NewCoupon {
            uuid: CouponUuid::new(),
            code: " save10 ".to_string(),
            discount: CouponDiscountData::Percentage {
                percent: Decimal::from(10),
            },
            scope,
            is_active: true,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn create_coupon_uppercases_code() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = ctx.coupons.create_coupon(ten_percent(CouponScope::All)).await?;

        assert_eq!(coupon.code, "SAVE10");

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(ten_percent(CouponScope::All)).await?;

        let mut duplicate = ten_percent(CouponScope::All);
        duplicate.code = "Save10".to_string();

        let result = ctx.coupons.create_coupon(duplicate).await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_percentage_is_rejected() {
        let ctx = TestContext::new().await;

        let mut coupon = ten_percent(CouponScope::All);
        coupon.discount = CouponDiscountData::Percentage {
            percent: Decimal::from(101),
        };

        let result = ctx.coupons.create_coupon(coupon).await;

        assert!(
            matches!(result, Err(CouponsServiceError::InvalidValue)),
            "expected InvalidValue, got {result:?}"
        );
    }

    #[tokio::test]
    async fn unknown_scope_target_returns_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .create_coupon(ten_percent(CouponScope::Category(CategoryUuid::new())))
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_merges_provided_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = ctx.coupons.create_coupon(ten_percent(CouponScope::All)).await?;

        let updated = ctx
            .coupons
            .update_coupon(
                coupon.uuid,
                CouponUpdate {
                    is_active: Some(false),
                    discount: Some(CouponDiscountData::Fixed { amount: 5_000 }),
                    ..CouponUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.code, "SAVE10");
        assert!(!updated.is_active);
        assert_eq!(updated.discount, CouponDiscountData::Fixed { amount: 5_000 });

        Ok(())
    }

    #[tokio::test]
    async fn list_active_only_filters_inactive() -> TestResult {
        let ctx = TestContext::new().await;

        let active = ctx.coupons.create_coupon(ten_percent(CouponScope::All)).await?;

        let mut inactive = ten_percent(CouponScope::All);
        inactive.code = "OFF".to_string();
        inactive.is_active = false;

        ctx.coupons.create_coupon(inactive).await?;

        let all = ctx.coupons.list_coupons(false).await?;
        let active_only = ctx.coupons.list_coupons(true).await?;

        assert_eq!(all.len(), 2);
        assert_eq!(
            active_only.iter().map(|c| c.uuid).collect::<Vec<_>>(),
            vec![active.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_makes_coupon_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = ctx.coupons.create_coupon(ten_percent(CouponScope::All)).await?;

        ctx.coupons.delete_coupon(coupon.uuid).await?;

        let result = ctx.coupons.get_coupon(coupon.uuid).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let again = ctx.coupons.delete_coupon(coupon.uuid).await;

        assert!(
            matches!(again, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn validate_blank_code_is_missing() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .validate_coupon("   ".to_string(), Vec::new(), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::MissingCode)),
            "expected MissingCode, got {result:?}"
        );
    }

    #[tokio::test]
    async fn validate_unknown_code_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .validate_coupon("NOPE".to_string(), Vec::new(), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn validate_reports_inactive_before_expired() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let mut coupon = ten_percent(CouponScope::All);
        coupon.is_active = false;
        coupon.expires_at = Some(now - SignedDuration::from_hours(2));

        ctx.coupons.create_coupon(coupon).await?;

        let result = ctx
            .coupons
            .validate_coupon("save10".to_string(), Vec::new(), now)
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::Inactive)),
            "expected Inactive, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn validate_expired_coupon() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let mut coupon = ten_percent(CouponScope::All);
        coupon.expires_at = Some(now - SignedDuration::from_mins(1));

        ctx.coupons.create_coupon(coupon).await?;

        let result = ctx
            .coupons
            .validate_coupon("SAVE10".to_string(), Vec::new(), now)
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::Expired)),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn validate_category_coupon_names_category() -> TestResult {
        let ctx = TestContext::new().await;
        let product = helpers::create_product(&ctx, "Basmati Rice", 12_000).await?;

        ctx.coupons
            .create_coupon(ten_percent(CouponScope::Category(product.category_uuid)))
            .await?;

        let lines = vec![
            CartLine {
                product: product.uuid,
                category: product.category_uuid,
            },
            CartLine {
                product: ProductUuid::new(),
                category: CategoryUuid::new(),
            },
        ];

        let validation = ctx
            .coupons
            .validate_coupon("SAVE10".to_string(), lines, Timestamp::now())
            .await?;

        assert!(validation.applicability.is_applicable);
        assert_eq!(
            validation.applicability.applies_to_text,
            format!("Category: {}", helpers::CATEGORY_NAME)
        );
        assert_eq!(
            validation.applicability.applicable_products.as_slice(),
            &[product.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn validate_product_coupon_outside_cart_is_not_applicable() -> TestResult {
        let ctx = TestContext::new().await;
        let product = helpers::create_product(&ctx, "Ghee", 90_000).await?;

        ctx.coupons
            .create_coupon(ten_percent(CouponScope::Product(product.uuid)))
            .await?;

        let validation = ctx
            .coupons
            .validate_coupon(
                "SAVE10".to_string(),
                vec![CartLine {
                    product: ProductUuid::new(),
                    category: product.category_uuid,
                }],
                Timestamp::now(),
            )
            .await?;

        assert!(!validation.applicability.is_applicable);
        assert_eq!(validation.applicability.applies_to_text, "Product: Ghee");
        assert_eq!(
            validation.applicability.applicable_products.as_slice(),
            &[product.uuid]
        );

        Ok(())
    }
}
