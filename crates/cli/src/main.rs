//! esicache command-line entry point.
//!
//! Logging goes to stderr as JSON so stdout carries only command output.

use anyhow::Result;
use clap::Parser;
use esicache_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::App;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!(backend = ?config.cache_backend, "loaded configuration");

    let app = App::new(config).await?;

    match cli.command {
        Commands::Fetch { url, scope, method, payload } => {
            println!("{}", app.fetch(&url, scope.as_deref(), &method, payload).await?);
        }
        Commands::Pages { base_url } => {
            println!("{}", app.pages(&base_url).await?);
        }
        Commands::Lookup { kind, id } => {
            println!("{}", app.lookup(kind, id).await?);
        }
        Commands::Purge => {
            println!("{}", app.purge().await?);
        }
    }

    Ok(())
}
