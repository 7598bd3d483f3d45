//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    cache::TtlCache,
    database::{self, Db},
    domain::{
        analytics::{AnalyticsService, PgAnalyticsService},
        catalog::{CatalogService, PgCatalogService},
        coupons::{CouponsService, PgCouponsService},
        courier::{SteadfastClient, models::CourierConfig},
        orders::{OrdersService, PgOrdersService},
        sessions::{PgSessionsService, SessionsService},
        settings::{PgSettingsService, SettingsService},
        visitors::{PgVisitorsService, VisitorsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub analytics: Arc<dyn AnalyticsService>,
    pub catalog: Arc<dyn CatalogService>,
    pub coupons: Arc<dyn CouponsService>,
    pub settings: Arc<dyn SettingsService>,
    pub visitors: Arc<dyn VisitorsService>,
    pub sessions: Arc<dyn SessionsService>,
    pub orders: Arc<dyn OrdersService>,
    pub cache: Arc<TtlCache>,
}

impl AppContext {
    /// Build application context from a database URL and courier credentials,
    /// applying pending migrations first when `run_migrations` is set.
    ///
    /// `total_tolerance` is the accepted gap, in minor units, between a customer's
    /// claimed order total and the total the server computes.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_config(
        database_url: &str,
        run_migrations: bool,
        courier: CourierConfig,
        total_tolerance: u64,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(database_url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        Ok(Self::from_db(Db::new(pool), courier, total_tolerance))
    }

    /// Build application context over an existing database handle.
    #[must_use]
    pub fn from_db(db: Db, courier: CourierConfig, total_tolerance: u64) -> Self {
        let cache = Arc::new(TtlCache::new());
        let sessions: Arc<dyn SessionsService> = Arc::new(PgSessionsService::new(db.clone()));

        Self {
            analytics: Arc::new(PgAnalyticsService::new(db.clone())),
            catalog: Arc::new(PgCatalogService::new(db.clone(), cache.clone())),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            settings: Arc::new(PgSettingsService::new(db.clone(), cache.clone())),
            visitors: Arc::new(PgVisitorsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(
                db,
                sessions.clone(),
                Arc::new(SteadfastClient::new(courier)),
                total_tolerance,
            )),
            sessions,
            cache,
        }
    }
}
