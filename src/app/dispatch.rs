use crate::cli::commands::{Cli, Commands};
use addonfn::Config;
use addonfn::dispatch::{Services, dispatch as dispatch_event};
use addonfn::event::Event;
use addonfn::transport::gateway;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;

/// Read an event from `input` (`-` for stdin).
async fn read_event(input: &str) -> Result<Event> {
    let raw = if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("read event from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("read event file {input}"))?
    };
    serde_json::from_str(&raw).context("parse event JSON")
}

async fn run_invoke(config: &Config, input: &str) -> Result<()> {
    let event = read_event(input).await?;
    let services = Services::from_config(config).context("build services")?;
    info!(event = %event.name, "invoking");
    let response = dispatch_event(&services, &event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            info!(%host, port, "starting gateway");
            gateway::run_gateway(&host, port, config).await
        }
        Commands::Invoke { input } => run_invoke(&config, &input).await,
    }
}
