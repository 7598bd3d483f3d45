//! Analytics Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    analytics::{
        data::{NewCartAdd, NewProductView, ReportWindows},
        records::{ProductCartAdds, ProductCheckouts, ProductViews, VisitorStats},
    },
    catalog::records::ProductUuid,
    columns::{try_get_u64, try_i32_from_u32},
};

const RECORD_PRODUCT_VIEW_SQL: &str = include_str!("sql/record_product_view.sql");
const RECORD_CART_ADD_SQL: &str = include_str!("sql/record_cart_add.sql");
const VISITOR_STATS_SQL: &str = include_str!("sql/visitor_stats.sql");
const MOST_VIEWED_PRODUCTS_SQL: &str = include_str!("sql/most_viewed_products.sql");
const MOST_CART_ADDED_PRODUCTS_SQL: &str = include_str!("sql/most_cart_added_products.sql");
const MOST_CHECKED_OUT_PRODUCTS_SQL: &str = include_str!("sql/most_checked_out_products.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAnalyticsRepository;

impl PgAnalyticsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn record_product_view(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        view: NewProductView,
    ) -> Result<(), sqlx::Error> {
        query(RECORD_PRODUCT_VIEW_SQL)
            .bind(view.uuid.into_uuid())
            .bind(view.product_uuid.into_uuid())
            .bind(view.visitor_token)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn record_cart_add(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart_add: NewCartAdd,
    ) -> Result<(), sqlx::Error> {
        query(RECORD_CART_ADD_SQL)
            .bind(cart_add.uuid.into_uuid())
            .bind(cart_add.product_uuid.into_uuid())
            .bind(cart_add.visitor_token)
            .bind(try_i32_from_u32(cart_add.quantity, "quantity")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn visitor_stats(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        windows: ReportWindows,
    ) -> Result<VisitorStats, sqlx::Error> {
        let row = query(VISITOR_STATS_SQL)
            .bind(SqlxTimestamp::from(windows.today))
            .bind(SqlxTimestamp::from(windows.week))
            .bind(SqlxTimestamp::from(windows.month))
            .fetch_one(&mut **tx)
            .await?;

        let unique = try_get_u64(&row, "unique_visitors")?;
        let repeat = try_get_u64(&row, "repeat_visitors")?;

        Ok(VisitorStats {
            total: unique + repeat,
            unique,
            repeat,
            today: try_get_u64(&row, "today")?,
            week: try_get_u64(&row, "week")?,
            month: try_get_u64(&row, "month")?,
        })
    }

    pub(crate) async fn most_viewed_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<ProductViews>, sqlx::Error> {
        query_as::<Postgres, ProductViews>(MOST_VIEWED_PRODUCTS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn most_cart_added_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<ProductCartAdds>, sqlx::Error> {
        query_as::<Postgres, ProductCartAdds>(MOST_CART_ADDED_PRODUCTS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn most_checked_out_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<ProductCheckouts>, sqlx::Error> {
        query_as::<Postgres, ProductCheckouts>(MOST_CHECKED_OUT_PRODUCTS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductViews {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            views: try_get_u64(row, "views")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductCartAdds {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            adds: try_get_u64(row, "adds")?,
            quantity: try_get_u64(row, "quantity")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductCheckouts {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            orders: try_get_u64(row, "orders")?,
            quantity: try_get_u64(row, "quantity")?,
        })
    }
}
