//! Checkout Sessions Repository

use grocer::sessions::{CustomerDetails, SessionState, SessionTimeline};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    columns::{
        try_get_optional_timestamp, try_get_optional_u64, try_get_timestamp, try_get_u64,
        try_i64_from_u64, try_optional_i64_from_u64,
    },
    sessions::{
        data::{NewSession, SessionFilter, SessionUpdate},
        records::{SessionRecord, SessionSummary, SessionUuid},
    },
    visitors::records::VisitorUuid,
};

const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const GET_SESSION_SQL: &str = include_str!("sql/get_session.sql");
const GET_SESSION_FOR_UPDATE_SQL: &str = include_str!("sql/get_session_for_update.sql");
const UPDATE_SESSION_SQL: &str = include_str!("sql/update_session.sql");
const TERMINATE_SESSION_SQL: &str = include_str!("sql/terminate_session.sql");
const LIST_SESSIONS_SQL: &str = include_str!("sql/list_sessions.sql");
const SESSION_SUMMARY_SQL: &str = include_str!("sql/session_summary.sql");
const LOCK_STALE_SESSIONS_SQL: &str = include_str!("sql/lock_stale_sessions.sql");

/// An active session picked up for expiry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StaleSession {
    pub(crate) uuid: SessionUuid,
    pub(crate) entry_time: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSessionsRepository;

impl PgSessionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        visitor: VisitorUuid,
        session: NewSession,
    ) -> Result<SessionRecord, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(CREATE_SESSION_SQL)
            .bind(session.uuid.into_uuid())
            .bind(visitor.into_uuid())
            .bind(session.cart_items)
            .bind(try_i64_from_u64(session.subtotal, "subtotal")?)
            .bind(session.applied_coupons)
            .bind(try_i64_from_u64(session.discount_amount, "discount_amount")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: SessionUuid,
    ) -> Result<SessionRecord, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(GET_SESSION_SQL)
            .bind(session.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Read a session and hold its row lock until the transaction ends.
    pub(crate) async fn get_session_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: SessionUuid,
    ) -> Result<SessionRecord, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(GET_SESSION_FOR_UPDATE_SQL)
            .bind(session.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Write the provided fields of an active session. `None` once it is terminal.
    pub(crate) async fn update_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: SessionUuid,
        update: SessionUpdate,
    ) -> Result<Option<SessionRecord>, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(UPDATE_SESSION_SQL)
            .bind(session.into_uuid())
            .bind(update.customer_name)
            .bind(update.customer_phone)
            .bind(update.customer_address)
            .bind(update.applied_coupons)
            .bind(try_optional_i64_from_u64(
                update.discount_amount,
                "discount_amount",
            )?)
            .bind(try_optional_i64_from_u64(update.subtotal, "subtotal")?)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Store a terminal timeline, guarded on the session still being active.
    pub(crate) async fn terminate_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: SessionUuid,
        timeline: &SessionTimeline,
        customer: &CustomerDetails,
    ) -> Result<Option<SessionRecord>, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(TERMINATE_SESSION_SQL)
            .bind(session.into_uuid())
            .bind(timeline.exit_time.map(SqlxTimestamp::from))
            .bind(try_optional_i64_from_u64(timeline.time_spent, "time_spent")?)
            .bind(timeline.order_completed)
            .bind(timeline.order_placed_at.map(SqlxTimestamp::from))
            .bind(customer.name.as_deref())
            .bind(customer.phone.as_deref())
            .bind(customer.address.as_deref())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_sessions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &SessionFilter,
    ) -> Result<Vec<SessionRecord>, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(LIST_SESSIONS_SQL)
            .bind(filter.visitor_token.as_deref())
            .bind(filter.state.as_ref().map(SessionState::as_str))
            .bind(i64::from(filter.limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn session_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<SessionSummary, sqlx::Error> {
        let row = query(SESSION_SUMMARY_SQL).fetch_one(&mut **tx).await?;

        Ok(SessionSummary {
            total: try_get_u64(&row, "total")?,
            active: try_get_u64(&row, "active")?,
            completed: try_get_u64(&row, "completed")?,
            abandoned: try_get_u64(&row, "abandoned")?,
        })
    }

    /// Lock active sessions untouched since `cutoff`, skipping rows locked elsewhere.
    pub(crate) async fn lock_stale_sessions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cutoff: Timestamp,
    ) -> Result<Vec<StaleSession>, sqlx::Error> {
        let rows = query(LOCK_STALE_SESSIONS_SQL)
            .bind(SqlxTimestamp::from(cutoff))
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(StaleSession {
                    uuid: SessionUuid::from_uuid(row.try_get("uuid")?),
                    entry_time: try_get_timestamp(row, "entry_time")?,
                })
            })
            .collect()
    }
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SessionUuid::from_uuid(row.try_get("uuid")?),
            visitor_uuid: VisitorUuid::from_uuid(row.try_get("visitor_uuid")?),
            visitor_token: row.try_get("visitor_token")?,
            entry_time: try_get_timestamp(row, "entry_time")?,
            exit_time: try_get_optional_timestamp(row, "exit_time")?,
            time_spent: try_get_optional_u64(row, "time_spent")?,
            customer: CustomerDetails {
                name: row.try_get("customer_name")?,
                phone: row.try_get("customer_phone")?,
                address: row.try_get("customer_address")?,
            },
            cart_items: row.try_get("cart_items")?,
            subtotal: try_get_u64(row, "subtotal")?,
            applied_coupons: row.try_get("applied_coupons")?,
            discount_amount: try_get_u64(row, "discount_amount")?,
            order_completed: row.try_get("order_completed")?,
            order_placed_at: try_get_optional_timestamp(row, "order_placed_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
