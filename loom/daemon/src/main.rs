//! Loom Daemon
//!
//! Standalone server process serving Loom sessions to browser tabs over
//! WebSocket. The bootstrap page itself is served by whatever HTTP front door
//! sits in front of the daemon; `--print-bootstrap` writes it to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the configured address (default 127.0.0.1:8000)
//! loom-daemon
//!
//! # Custom address and origin allow list
//! loom-daemon --addr 0.0.0.0:9000 --origin https://example.com
//!
//! # Render the bootstrap document
//! loom-daemon --print-bootstrap > index.html
//!
//! # With verbose logging
//! RUST_LOG=debug loom-daemon
//! ```
//!
//! # Environment Variables
//!
//! - `LOOM_CONFIG`: configuration file (default `$XDG_CONFIG_HOME/loom/loom.toml`)
//! - `LOOM_ADDR`, `LOOM_TITLE`, `LOOM_AUTO_CLOSE`, `LOOM_ORIGINS`, ...: see `AppParams`
//! - `LOOM_RESOURCES`: directory of `.rui` theme and string files
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)
//!
//! # Signals
//!
//! - SIGINT: Graceful shutdown (aborts open connections)

mod demo;
mod server;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use loom_core::transport::OriginPolicy;
use loom_core::{bootstrap_html, App, AppParams, BridgeConfig, Resources};

use crate::demo::Demo;
use crate::server::DaemonServer;

/// Serve Loom sessions over WebSocket
#[derive(Debug, Parser)]
#[command(name = "loom-daemon", version, about)]
struct Args {
    /// Configuration file
    #[arg(long, env = "LOOM_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides the configuration)
    #[arg(long)]
    addr: Option<String>,

    /// Allowed WebSocket origin; repeat for several (overrides the configuration)
    #[arg(long = "origin")]
    origins: Vec<String>,

    /// Directory of `.rui` resources (themes, strings)
    #[arg(long, env = "LOOM_RESOURCES")]
    resources: Option<PathBuf>,

    /// Print the bootstrap document and exit
    #[arg(long)]
    print_bootstrap: bool,
}

fn load_params(args: &Args) -> anyhow::Result<AppParams> {
    let params = match &args.config {
        Some(path) => AppParams::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => AppParams::load_default(),
    };
    let mut params = params.with_env_overrides();
    if let Some(addr) = &args.addr {
        params.listen_addr.clone_from(addr);
    }
    if !args.origins.is_empty() {
        params.allowed_origins.clone_from(&args.origins);
    }
    Ok(params)
}

fn load_resources(args: &Args) -> anyhow::Result<Resources> {
    let mut resources = Resources::new();
    if let Some(dir) = &args.resources {
        let count = resources
            .load_dir(dir)
            .with_context(|| format!("Failed to load resources from {}", dir.display()))?;
        info!(count, dir = %dir.display(), "Resources loaded");
    }
    Ok(resources)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let params = load_params(&args)?;

    if args.print_bootstrap {
        print!("{}", bootstrap_html(&params));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("loom_daemon=info".parse()?)
                .add_directive("loom_core=info".parse()?),
        )
        .with_target(true)
        .init();

    info!("Starting Loom Daemon");
    info!("PID: {}", std::process::id());

    let resources = load_resources(&args)?;
    let policy = OriginPolicy::from_config(&params.allowed_origins);
    if policy.is_allow_all() {
        info!("Accepting WebSocket upgrades from any origin");
    }

    let app = App::new(params, resources, Demo::default).with_bridge_config(BridgeConfig::from_env());
    let server = DaemonServer::bind(app, policy).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for the shutdown signal");
            std::future::pending::<()>().await;
        }
    };
    server.run(shutdown).await
}
