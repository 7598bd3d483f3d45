use clap::Args;
use grocer_app::{
    database::{self, Db},
    domain::sessions::{PgSessionsService, SessionsService},
};
use jiff::{SignedDuration, Timestamp};

#[derive(Debug, Args)]
pub(crate) struct ExpireArgs {
    /// Minutes without an update after which an active session is ended
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    idle_minutes: u32,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ExpireArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgSessionsService::new(Db::new(pool));

    let now = Timestamp::now();
    let cutoff = now
        .checked_sub(SignedDuration::from_mins(i64::from(args.idle_minutes)))
        .map_err(|error| format!("invalid idle cutoff: {error}"))?;

    let expired = service
        .expire_stale_sessions(cutoff, now)
        .await
        .map_err(|error| format!("failed to expire sessions: {error}"))?;

    println!("expired_sessions: {expired}");

    Ok(())
}
