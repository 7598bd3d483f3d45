use clap::{Parser, Subcommand};

mod coupons;
mod db;
mod sessions;

#[derive(Debug, Parser)]
#[command(name = "grocer-app", about = "Grocer CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Sessions(sessions::SessionsCommand),
    Coupons(coupons::CouponsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Sessions(command) => sessions::run(command).await,
            Commands::Coupons(command) => coupons::run(command).await,
        }
    }
}
