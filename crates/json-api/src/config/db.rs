//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Apply pending schema migrations before serving
    #[arg(long, env = "RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,
}
