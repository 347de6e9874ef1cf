#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::FmtSubscriber;

mod app;
mod cli;

use addonfn::Config;
use cli::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    // This prevents the error: "could not automatically determine the process-level CryptoProvider"
    // when both aws-lc-rs and ring features are available (or neither is explicitly selected).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Logs go to stderr; `invoke` prints its response on stdout.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.observability.level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    // The log level comes from the config, so the load is reported here.
    if config.loaded_from_file {
        tracing::info!(path = %config.config_path.display(), "config loaded");
    } else {
        tracing::debug!(
            path = %config.config_path.display(),
            "config file absent, using defaults"
        );
    }

    app::dispatch::dispatch(cli, Arc::new(config)).await
}
