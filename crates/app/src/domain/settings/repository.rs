//! Settings Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    columns::{try_get_timestamp, try_get_u64, try_optional_i64_from_u64},
    settings::{data::SettingsUpdate, records::SettingsRecord},
};

const ENSURE_SETTINGS_SQL: &str = include_str!("sql/ensure_settings.sql");
const GET_SETTINGS_SQL: &str = include_str!("sql/get_settings.sql");
const UPDATE_SETTINGS_SQL: &str = include_str!("sql/update_settings.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSettingsRepository;

impl PgSettingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Read the settings row, inserting the defaults on first use.
    pub(crate) async fn get_settings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<SettingsRecord, sqlx::Error> {
        query(ENSURE_SETTINGS_SQL).execute(&mut **tx).await?;

        query_as::<Postgres, SettingsRecord>(GET_SETTINGS_SQL)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_settings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        update: SettingsUpdate,
    ) -> Result<SettingsRecord, sqlx::Error> {
        query(ENSURE_SETTINGS_SQL).execute(&mut **tx).await?;

        query_as::<Postgres, SettingsRecord>(UPDATE_SETTINGS_SQL)
            .bind(try_optional_i64_from_u64(
                update.delivery_charge,
                "delivery_charge",
            )?)
            .bind(update.currency)
            .bind(update.store_name)
            .bind(update.store_logo)
            .bind(update.store_favicon)
            .bind(update.phone)
            .bind(update.facebook)
            .bind(update.messenger)
            .bind(update.whatsapp)
            .bind(update.about_us)
            .bind(update.privacy_policy)
            .bind(update.terms_condition)
            .bind(update.refund_policy)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for SettingsRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            delivery_charge: try_get_u64(row, "delivery_charge")?,
            currency: row.try_get("currency")?,
            store_name: row.try_get("store_name")?,
            store_logo: row.try_get("store_logo")?,
            store_favicon: row.try_get("store_favicon")?,
            phone: row.try_get("phone")?,
            facebook: row.try_get("facebook")?,
            messenger: row.try_get("messenger")?,
            whatsapp: row.try_get("whatsapp")?,
            about_us: row.try_get("about_us")?,
            privacy_policy: row.try_get("privacy_policy")?,
            terms_condition: row.try_get("terms_condition")?,
            refund_policy: row.try_get("refund_policy")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
