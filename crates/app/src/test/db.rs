//! Per-test databases inside one shared PostgreSQL container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

const USER: &str = "grocer_test";
const PASSWORD: &str = "grocer_test_password";

static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Names of databases whose `TestDb` was dropped; a background task drops them.
static DROPPED: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn container() -> &'static ContainerAsync<PostgresImage> {
    CONTAINER
        .get_or_init(|| async {
            PostgresImage::default()
                .with_user(USER)
                .with_password(PASSWORD)
                .with_db_name(USER)
                .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
                .start()
                .await
                .expect("Failed to start PostgreSQL container")
        })
        .await
}

/// Connection URL for `database` in the shared container.
async fn database_url(database: &str) -> String {
    let port = container()
        .await
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}")
}

async fn admin(statement: String) -> Result<(), sqlx::Error> {
    let mut conn = PgConnection::connect(&database_url("postgres").await).await?;

    sqlx::query(&statement).execute(&mut conn).await?;

    conn.close().await
}

fn spawn_reaper() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(err) = admin(format!("DROP DATABASE IF EXISTS \"{name}\"")).await {
                eprintln!("Failed to drop test database {name}: {err}");
            }
        }
    });

    sender
}

/// Generated names are lowercase hex so they never need escaping.
fn unique_name() -> String {
    format!("grocer_test_{}", Uuid::now_v7().simple())
}

/// A freshly migrated database, dropped when this value goes out of scope.
///
/// Services commit normally; isolation comes from every test owning its database.
#[derive(Debug, Clone)]
pub struct TestDb {
    pool: PgPool,
    name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROPPED.get() {
            let _queued = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        DROPPED
            .get_or_init(|| async { spawn_reaper() })
            .await;

        let name = unique_name();

        admin(format!("CREATE DATABASE \"{name}\""))
            .await
            .expect("Failed to create test database");

        let pool = PgPool::connect(&database_url(&name).await)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_plain_identifiers() {
        let name = unique_name();

        assert!(name.len() <= 63, "postgres truncates identifiers past 63 bytes");
        assert!(
            name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
            "unexpected character in {name}"
        );
        assert_ne!(name, unique_name());
    }

    #[tokio::test]
    async fn migrations_seed_the_visitor_sequence() {
        let test_db = TestDb::new().await;

        let serial: i64 = sqlx::query_scalar("SELECT nextval('visitor_serial_seq')")
            .fetch_one(test_db.pool())
            .await
            .expect("Failed to read visitor sequence");

        assert_eq!(serial, 1);
    }

    #[tokio::test]
    async fn migrations_create_storefront_tables() {
        let test_db = TestDb::new().await;

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables
             WHERE table_name IN ('categories', 'products', 'varieties', 'coupons',
                                  'site_settings', 'visitors', 'checkout_sessions',
                                  'orders', 'order_items', 'order_coupons',
                                  'product_views', 'cart_adds')",
        )
        .fetch_one(test_db.pool())
        .await
        .expect("Failed to inspect schema");

        assert_eq!(tables, 12);
    }
}
