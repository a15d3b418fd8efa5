use clap::Parser;
use ferry::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            ferry::cli::init::run(path).await?;
        }
        Some(Commands::Serve { host, port }) => {
            ferry::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate { command }) => {
            ferry::cli::migrate::run(&cli.config, command).await?;
        }
        Some(Commands::User { command }) => {
            ferry::cli::user::run(&cli.config, command).await?;
        }
        Some(Commands::Token { command }) => {
            ferry::cli::token::run(&cli.config, command).await?;
        }
        Some(Commands::Person { command }) => {
            ferry::cli::person::run(&cli.config, command).await?;
        }
        None => {
            // No subcommand provided, print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
