//! Coupons Repository

use grocer::{
    coupons::CouponScope,
    ids::{CategoryUuid, ProductUuid},
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    columns::{
        try_get_optional_timestamp, try_get_optional_u64, try_get_timestamp,
        try_optional_i64_from_u64,
    },
    coupons::{
        data::{CouponDiscountData, NewCoupon},
        records::{CouponRecord, CouponUuid},
    },
};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");
const GET_COUPON_FOR_UPDATE_SQL: &str = include_str!("sql/get_coupon_for_update.sql");
const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const FIND_COUPONS_BY_CODES_SQL: &str = include_str!("sql/find_coupons_by_codes.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const UPDATE_COUPON_SQL: &str = include_str!("sql/update_coupon.sql");
const DELETE_COUPON_SQL: &str = include_str!("sql/delete_coupon.sql");

/// Coupon columns other than the identifier and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CouponValues {
    pub(crate) code: String,
    pub(crate) discount: CouponDiscountData,
    pub(crate) scope: CouponScope,
    pub(crate) is_active: bool,
    pub(crate) expires_at: Option<Timestamp>,
}

impl From<&CouponRecord> for CouponValues {
    fn from(record: &CouponRecord) -> Self {
        Self {
            code: record.code.clone(),
            discount: record.discount,
            scope: record.scope,
            is_active: record.is_active,
            expires_at: record.expires_at,
        }
    }
}

impl From<NewCoupon> for CouponValues {
    fn from(coupon: NewCoupon) -> Self {
        Self {
            code: coupon.code,
            discount: coupon.discount,
            scope: coupon.scope,
            is_active: coupon.is_active,
            expires_at: coupon.expires_at,
        }
    }
}

type DiscountColumns = (&'static str, Option<i64>, Option<Decimal>);
type ScopeColumns = (&'static str, Option<Uuid>, Option<Uuid>);

fn discount_columns(discount: CouponDiscountData) -> Result<DiscountColumns, sqlx::Error> {
    Ok(match discount {
        CouponDiscountData::Percentage { percent } => (discount.type_as_str(), None, Some(percent)),
        CouponDiscountData::Fixed { amount } => (
            discount.type_as_str(),
            try_optional_i64_from_u64(Some(amount), "amount")?,
            None,
        ),
    })
}

fn scope_columns(scope: CouponScope) -> ScopeColumns {
    match scope {
        CouponScope::All => (scope.as_str(), None, None),
        CouponScope::Category(category) => (scope.as_str(), Some(category.into_uuid()), None),
        CouponScope::Product(product) => (scope.as_str(), None, Some(product.into_uuid())),
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CouponUuid,
        values: CouponValues,
    ) -> Result<CouponRecord, sqlx::Error> {
        let (discount_type, amount, percent) = discount_columns(values.discount)?;
        let (apply_to, category_uuid, product_uuid) = scope_columns(values.scope);

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(uuid.into_uuid())
            .bind(values.code)
            .bind(discount_type)
            .bind(amount)
            .bind(percent)
            .bind(apply_to)
            .bind(category_uuid)
            .bind(product_uuid)
            .bind(values.is_active)
            .bind(values.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_FOR_UPDATE_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        codes: &[String],
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPONS_BY_CODES_SQL)
            .bind(codes)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        active_only: bool,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .bind(active_only)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CouponUuid,
        values: CouponValues,
    ) -> Result<CouponRecord, sqlx::Error> {
        let (discount_type, amount, percent) = discount_columns(values.discount)?;
        let (apply_to, category_uuid, product_uuid) = scope_columns(values.scope);

        query_as::<Postgres, CouponRecord>(UPDATE_COUPON_SQL)
            .bind(uuid.into_uuid())
            .bind(values.code)
            .bind(discount_type)
            .bind(amount)
            .bind(percent)
            .bind(apply_to)
            .bind(category_uuid)
            .bind(product_uuid)
            .bind(values.is_active)
            .bind(values.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_COUPON_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;

        let discount = match discount_type.as_str() {
            "percentage" => CouponDiscountData::Percentage {
                percent: row
                    .try_get::<Option<Decimal>, _>("percent")?
                    .ok_or_else(|| decode_error("percent", "missing percent".to_string()))?,
            },
            "fixed" => CouponDiscountData::Fixed {
                amount: try_get_optional_u64(row, "amount")?
                    .ok_or_else(|| decode_error("amount", "missing amount".to_string()))?,
            },
            other => {
                return Err(decode_error(
                    "discount_type",
                    format!("unknown discount type {other}"),
                ));
            }
        };

        let apply_to: String = row.try_get("apply_to")?;
        let category_uuid: Option<Uuid> = row.try_get("category_uuid")?;
        let product_uuid: Option<Uuid> = row.try_get("product_uuid")?;

        let scope = match (apply_to.as_str(), category_uuid, product_uuid) {
            ("all", _, _) => CouponScope::All,
            ("category", Some(category), _) => CouponScope::Category(CategoryUuid::from_uuid(category)),
            ("product", _, Some(product)) => CouponScope::Product(ProductUuid::from_uuid(product)),
            (other, _, _) => {
                return Err(decode_error("apply_to", format!("invalid coupon scope {other}")));
            }
        };

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount,
            scope,
            is_active: row.try_get("is_active")?,
            expires_at: try_get_optional_timestamp(row, "expires_at")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
