//! Voyagent - Conversational travel booking agent
//!
//! Main entry point for the Voyagent application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use voyagent::cli::{Cli, Commands};
use voyagent::commands;
use voyagent::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;
    config.validate()?;

    match cli.command {
        Commands::Serve { port } => {
            tracing::info!("starting chat endpoint");
            commands::serve::run_serve(config, port).await?;
            Ok(())
        }
        Commands::Chat { session } => {
            tracing::info!("starting interactive chat session '{}'", session);
            commands::chat::run_chat(config, session).await?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "voyagent=debug"
    } else {
        "voyagent=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
