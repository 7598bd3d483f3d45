//! Orders Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    columns::{try_get_optional_timestamp, try_get_timestamp, try_get_u64, try_i64_from_u64},
    orders::{
        data::{OrderFilter, OrderUpdate},
        records::{OrderRecord, OrderStatus, OrderUuid},
    },
    sessions::records::SessionUuid,
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_ORDER_FOR_UPDATE_SQL: &str = include_str!("../sql/get_order_for_update.sql");
const FIND_ORDER_FOR_COURIER_SQL: &str = include_str!("../sql/find_order_for_courier.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const TRACK_ORDERS_BY_PHONE_SQL: &str = include_str!("../sql/track_orders_by_phone.sql");
const UPDATE_ORDER_SQL: &str = include_str!("../sql/update_order.sql");
const DELETE_ORDER_SQL: &str = include_str!("../sql/delete_order.sql");

/// Server-computed order header, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderHeader {
    pub(crate) uuid: OrderUuid,
    pub(crate) customer_name: String,
    pub(crate) customer_phone: String,
    pub(crate) customer_email: Option<String>,
    pub(crate) customer_address: String,
    pub(crate) subtotal: u64,
    pub(crate) discount: u64,
    pub(crate) delivery_charge: u64,
    pub(crate) total: u64,
    pub(crate) session_uuid: Option<SessionUuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        header: &OrderHeader,
        invoice: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(header.uuid.into_uuid())
            .bind(invoice)
            .bind(&header.customer_name)
            .bind(&header.customer_phone)
            .bind(header.customer_email.as_deref())
            .bind(&header.customer_address)
            .bind(try_i64_from_u64(header.subtotal, "subtotal")?)
            .bind(try_i64_from_u64(header.discount, "discount")?)
            .bind(try_i64_from_u64(header.delivery_charge, "delivery_charge")?)
            .bind(try_i64_from_u64(header.total, "total")?)
            .bind(header.session_uuid.map(SessionUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_FOR_UPDATE_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Lock the order a courier notification refers to, by invoice or consignment id.
    pub(crate) async fn find_order_for_courier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        invoice: Option<&str>,
        consignment_id: Option<&str>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDER_FOR_COURIER_SQL)
            .bind(invoice)
            .bind(consignment_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(filter.status.as_ref().map(OrderStatus::as_str))
            .bind(filter.search.as_deref())
            .fetch_all(&mut **tx)
            .await
    }

    /// Orders whose phone, with formatting stripped, contains `phone`.
    pub(crate) async fn track_orders_by_phone(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        phone: &str,
        limit: u32,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(TRACK_ORDERS_BY_PHONE_SQL)
            .bind(phone)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        update: OrderUpdate,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(update.status.as_ref().map(OrderStatus::as_str))
            .bind(update.admin_note)
            .bind(update.courier_status)
            .bind(update.tracking_code)
            .bind(update.consignment_id)
            .bind(update.tracking_message)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            invoice: row.try_get("invoice")?,
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_email: row.try_get("customer_email")?,
            customer_address: row.try_get("customer_address")?,
            subtotal: try_get_u64(row, "subtotal")?,
            discount: try_get_u64(row, "discount")?,
            delivery_charge: try_get_u64(row, "delivery_charge")?,
            total: try_get_u64(row, "total")?,
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            payment_status: row.try_get("payment_status")?,
            admin_note: row.try_get("admin_note")?,
            consignment_id: row.try_get("consignment_id")?,
            tracking_code: row.try_get("tracking_code")?,
            courier_status: row.try_get("courier_status")?,
            tracking_message: row.try_get("tracking_message")?,
            session_uuid: row
                .try_get::<Option<Uuid>, _>("session_uuid")?
                .map(SessionUuid::from_uuid),
            items: Vec::new(),
            coupons: Vec::new(),
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
            approved_at: try_get_optional_timestamp(row, "approved_at")?,
            delivered_at: try_get_optional_timestamp(row, "delivered_at")?,
        })
    }
}
