//! Visitors Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    columns::{try_get_timestamp, try_get_u64},
    visitors::{
        data::VisitorContact,
        records::{VisitorRecord, VisitorUuid},
    },
};

const CREATE_VISITOR_SQL: &str = include_str!("sql/create_visitor.sql");
const GET_VISITOR_BY_TOKEN_SQL: &str = include_str!("sql/get_visitor_by_token.sql");
const UPDATE_VISITOR_SQL: &str = include_str!("sql/update_visitor.sql");
const BACKFILL_VISITOR_CONTACT_SQL: &str = include_str!("sql/backfill_visitor_contact.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVisitorsRepository;

impl PgVisitorsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Mint a visitor with the next serial number.
    pub(crate) async fn create_visitor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: VisitorUuid,
    ) -> Result<VisitorRecord, sqlx::Error> {
        query_as::<Postgres, VisitorRecord>(CREATE_VISITOR_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &str,
    ) -> Result<Option<VisitorRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorRecord>(GET_VISITOR_BY_TOKEN_SQL)
            .bind(token)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Overwrite the contact fields that carry a value.
    pub(crate) async fn update_visitor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &str,
        contact: VisitorContact,
    ) -> Result<VisitorRecord, sqlx::Error> {
        query_as::<Postgres, VisitorRecord>(UPDATE_VISITOR_SQL)
            .bind(token)
            .bind(contact.name)
            .bind(contact.phone)
            .bind(contact.email)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fill name and phone only where they are still unset.
    pub(crate) async fn backfill_contact(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        visitor: VisitorUuid,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        query(BACKFILL_VISITOR_CONTACT_SQL)
            .bind(visitor.into_uuid())
            .bind(name)
            .bind(phone)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for VisitorRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VisitorUuid::from_uuid(row.try_get("uuid")?),
            serial: try_get_u64(row, "serial")?,
            token: row.try_get("token")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
