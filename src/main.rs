//! cgi-gateway
//!
//! Serves HTTP by running one pre-built executable per request.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ───────────────▶ http::server ──▶ http::handler ──▶ routing (route table, matcher)
//!                                          │
//!                                          ▼
//!                                    dispatch (env, spawn, deadline)
//!                                          │ stdin ◀── request body
//!                                          ▼ stdout ──▶ response body
//!   Client Response
//!   ◀───────────────────────────────────────┘
//!
//!   Startup: config → routes.toml → build scripts → check binaries → listen
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use cgi_gateway::lifecycle::{self, signals, Shutdown, StartupOptions};
use cgi_gateway::observability::{logging, metrics};
use cgi_gateway::{GatewayConfig, GatewayError, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "cgi-gateway")]
#[command(about = "Run pre-built executables behind HTTP, CGI style", long_about = None)]
struct Cli {
    /// Directory holding routes.toml, the scripts and the built binaries.
    #[arg(long, env = "CGI_DIR")]
    cgi_dir: Option<PathBuf>,

    /// Gateway configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Route file, defaults to <CGI_DIR>/routes.toml.
    #[arg(long)]
    routes: Option<PathBuf>,

    /// Listen address, overrides the configuration.
    #[arg(short, long)]
    bind: Option<String>,

    /// Do not run the compiler; binaries must already exist.
    #[arg(long)]
    skip_build: bool,
}

impl From<Cli> for StartupOptions {
    fn from(cli: Cli) -> Self {
        StartupOptions {
            cgi_dir: cli.cgi_dir,
            config_path: cli.config,
            routes_path: cli.routes,
            bind_address: cli.bind,
            skip_build: cli.skip_build,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let options = StartupOptions::from(Cli::parse());

    // Logging settings live in the config file, so it is read before the
    // subscriber exists and then handed to startup as is.
    let config = match lifecycle::startup::load_configuration(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.observability);

    match run(options, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(options: StartupOptions, config: GatewayConfig) -> Result<(), GatewayError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cgi-gateway starting");

    let prepared = lifecycle::prepare(&options, config).await?;
    let config = prepared.config;

    if config.observability.metrics_enabled {
        // Validation already checked the address.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    HttpServer::new(config, prepared.routes)
        .run(listener, server_shutdown)
        .await?;

    Ok(())
}
