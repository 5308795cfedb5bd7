mod app;
mod config;
mod effects;
mod logging;
mod reload;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use client_logging::{client_info, parse_level};
use pffweb_engine::{reload_url, TungsteniteTransport};
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, DEFAULT_CONFIG_FILENAME};
use crate::reload::{perform_reload, run_until_reload, ReloadOutcome, ReloadSettings};

#[derive(Debug, Parser)]
#[command(name = "pffweb", version, about = "Search client and live-reload helper for pff-web")]
struct Cli {
    /// Path to the RON config file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Server base URL, e.g. http://localhost:8800
    #[arg(long)]
    base_url: Option<String>,

    /// off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive search; each input line is the new search box value.
    Search {
        /// Search for this term right away.
        #[arg(long)]
        query: Option<String>,
    },
    /// Watch the reload socket and run a command on every reload.
    Reload {
        /// Command to run on reload (after `--`); prints `reload` when omitted.
        #[arg(last = true)]
        on_reload: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    let Some(level) = parse_level(&config.log_level) else {
        bail!("unknown log level {:?}", config.log_level);
    };
    logging::initialize(level, config.log_file.as_deref());

    match cli.command {
        Command::Search { query } => app::run_search(&config, query),
        Command::Reload { on_reload } => {
            if !on_reload.is_empty() {
                config.on_reload = Some(on_reload);
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(watch_reload(&config))
        }
    }
}

async fn watch_reload(config: &ClientConfig) -> anyhow::Result<()> {
    let endpoint = reload_url(&config.base_url()?)?;
    let settings = ReloadSettings {
        reconnect_delay: config.reconnect_delay(),
        connect_timeout: config.connect_timeout(),
    };

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    client_info!("Watching {} for reload signals", endpoint);
    let transport = TungsteniteTransport;
    loop {
        match run_until_reload(&transport, &endpoint, settings, &shutdown).await {
            ReloadOutcome::Reload => {
                client_info!("Reloading.");
                perform_reload(config.on_reload.as_deref()).await;
            }
            ReloadOutcome::Shutdown => break,
        }
    }
    Ok(())
}
