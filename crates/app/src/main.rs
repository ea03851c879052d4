//! Relay - API request client with per-environment variables.

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use relay_infrastructure::RelaySettings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::cli::{Cli, Commands, HistoryCommands};
use crate::commands::App;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = RelaySettings::load(cli.config.as_deref())
        .await
        .context("failed to load settings")?;
    if let Some(proxy_url) = &cli.proxy_url {
        settings.proxy_url =
            Url::parse(proxy_url).with_context(|| format!("invalid --proxy-url '{proxy_url}'"))?;
    }
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }
    tracing::debug!(proxy_url = %settings.proxy_url, data_dir = %settings.data_dir.display(), "settings loaded");

    let app = App::new(settings);
    match cli.command {
        Commands::Env(command) => app.env(command).await,
        Commands::Send {
            request,
            collection,
        } => app.send(&request, collection).await,
        Commands::Preview { request } => app.preview(&request).await,
        Commands::Save {
            request,
            collection,
        } => app.save(&request, collection).await,
        Commands::History { command } => {
            app.history(command.unwrap_or(HistoryCommands::List)).await
        }
        Commands::Collections(command) => app.collections(command).await,
    }
}
