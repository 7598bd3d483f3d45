//! Order Items Repository

use grocer::ids::{CouponUuid, ProductUuid};
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    columns::{try_get_u32, try_get_u64, try_i32_from_u32, try_i64_from_u64},
    orders::records::{OrderCouponRecord, OrderItemRecord, OrderItemUuid, OrderUuid},
};

const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("../sql/list_order_items.sql");
const CREATE_ORDER_COUPON_SQL: &str = include_str!("../sql/create_order_coupon.sql");
const LIST_ORDER_COUPONS_SQL: &str = include_str!("../sql/list_order_coupons.sql");

/// Item row with the order it belongs to.
#[derive(Debug, Clone)]
struct OrderItemRow {
    order_uuid: OrderUuid,
    item: OrderItemRecord,
}

/// Coupon usage row with the order it belongs to.
#[derive(Debug, Clone)]
struct OrderCouponRow {
    order_uuid: OrderUuid,
    coupon: OrderCouponRecord,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: u32,
        item: &OrderItemRecord,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        let row = query_as::<Postgres, OrderItemRow>(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(try_i32_from_u32(position, "position")?)
            .bind(item.product_uuid.map(ProductUuid::into_uuid))
            .bind(&item.product_name)
            .bind(item.variety_name.as_deref())
            .bind(try_i64_from_u64(item.price, "price")?)
            .bind(try_i32_from_u32(item.quantity, "quantity")?)
            .bind(try_i64_from_u64(item.total, "total")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok(row.item)
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        coupon: &OrderCouponRecord,
    ) -> Result<OrderCouponRecord, sqlx::Error> {
        let row = query_as::<Postgres, OrderCouponRow>(CREATE_ORDER_COUPON_SQL)
            .bind(order.into_uuid())
            .bind(coupon.coupon_uuid.map(CouponUuid::into_uuid))
            .bind(&coupon.code)
            .bind(try_i64_from_u64(coupon.discount, "discount")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok(row.coupon)
    }

    /// Items of each order, in position order.
    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<FxHashMap<OrderUuid, Vec<OrderItemRecord>>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(LIST_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut items: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for row in rows {
            items.entry(row.order_uuid).or_default().push(row.item);
        }

        Ok(items)
    }

    /// Coupon usages of each order, by code.
    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<FxHashMap<OrderUuid, Vec<OrderCouponRecord>>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderCouponRow>(LIST_ORDER_COUPONS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut coupons: FxHashMap<OrderUuid, Vec<OrderCouponRecord>> = FxHashMap::default();

        for row in rows {
            coupons.entry(row.order_uuid).or_default().push(row.coupon);
        }

        Ok(coupons)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: OrderItemRecord {
                uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
                product_uuid: row
                    .try_get::<Option<Uuid>, _>("product_uuid")?
                    .map(ProductUuid::from_uuid),
                product_name: row.try_get("product_name")?,
                variety_name: row.try_get("variety_name")?,
                price: try_get_u64(row, "price")?,
                quantity: try_get_u32(row, "quantity")?,
                total: try_get_u64(row, "total")?,
            },
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderCouponRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            coupon: OrderCouponRecord {
                coupon_uuid: row
                    .try_get::<Option<Uuid>, _>("coupon_uuid")?
                    .map(CouponUuid::from_uuid),
                code: row.try_get("code")?,
                discount: try_get_u64(row, "discount")?,
            },
        })
    }
}
