use clap::{Args, Subcommand};

mod expire;

#[derive(Debug, Args)]
pub(crate) struct SessionsCommand {
    #[command(subcommand)]
    command: SessionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionsSubcommand {
    /// End checkout sessions left active past an idle cutoff
    Expire(expire::ExpireArgs),
}

pub(crate) async fn run(command: SessionsCommand) -> Result<(), String> {
    match command.command {
        SessionsSubcommand::Expire(args) => expire::run(args).await,
    }
}
