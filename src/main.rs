use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hearsay::app::AppContext;
use hearsay::cli::{commands, Cli, Commands};
use hearsay::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "hearsay=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Play { url, once } => {
            commands::play(&ctx, &url, once).await?;
        }
        Commands::Text { url } => {
            commands::print_text(&ctx, &url).await?;
        }
        Commands::Resolve { url } => {
            commands::resolve(&ctx, &url).await?;
        }
    }

    Ok(())
}
