//! Settings Service

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    cache::{SETTINGS_TTL, TtlCache},
    database::Db,
    domain::settings::{
        SettingsServiceError, data::SettingsUpdate, records::SettingsRecord,
        repository::PgSettingsRepository,
    },
    money::find_currency,
};

pub(crate) const SETTINGS_CACHE_KEY: &str = "settings";

#[derive(Debug, Clone)]
pub struct PgSettingsService {
    db: Db,
    cache: Arc<TtlCache>,
    repository: PgSettingsRepository,
}

impl PgSettingsService {
    #[must_use]
    pub fn new(db: Db, cache: Arc<TtlCache>) -> Self {
        Self {
            db,
            cache,
            repository: PgSettingsRepository::new(),
        }
    }
}

#[async_trait]
impl SettingsService for PgSettingsService {
    #[tracing::instrument(name = "settings.service.get_settings", skip(self), err)]
    async fn get_settings(&self) -> Result<SettingsRecord, SettingsServiceError> {
        if let Some(settings) = self.cache.get::<SettingsRecord>(SETTINGS_CACHE_KEY) {
            debug!("settings cache hit");

            return Ok(settings);
        }

        let mut tx = self.db.begin().await?;

        let settings = self.repository.get_settings(&mut tx).await?;

        tx.commit().await?;

        self.cache.set(SETTINGS_CACHE_KEY, &settings, SETTINGS_TTL);

        Ok(settings)
    }

    #[tracing::instrument(name = "settings.service.update_settings", skip(self, update), err)]
    async fn update_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<SettingsRecord, SettingsServiceError> {
        let mut update = update;

        if let Some(code) = update.currency.take() {
            let currency = find_currency(&code).ok_or(SettingsServiceError::UnknownCurrency(code))?;

            update.currency = Some(currency.iso_alpha_code.to_string());
        }

        let mut tx = self.db.begin().await?;

        let settings = self.repository.update_settings(&mut tx, update).await?;

        tx.commit().await?;

        self.cache.invalidate_prefix(SETTINGS_CACHE_KEY);

        info!(currency = %settings.currency, "updated settings");

        Ok(settings)
    }
}

#[automock]
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Current site settings, created with defaults on first read.
    async fn get_settings(&self) -> Result<SettingsRecord, SettingsServiceError>;

    /// Merge the provided fields into the site settings.
    async fn update_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<SettingsRecord, SettingsServiceError>;
}
