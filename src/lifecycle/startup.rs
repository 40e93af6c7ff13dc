//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration and the route file
//! - Run the compiler for every route
//! - Verify every route's executable exists
//! - Freeze the route table
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, there is no partial startup
//! - Builds run one at a time, in route file order

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::loader::{load_config, load_routes};
use crate::config::validation::validate_config;
use crate::config::{BuildConfig, ConfigError, GatewayConfig, RouteConfig};
use crate::error::GatewayError;
use crate::routing::RouteTable;

/// Name of the route file inside the CGI directory.
pub const ROUTES_FILE: &str = "routes.toml";

/// Inputs collected from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub cgi_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub routes_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub skip_build: bool,
}

/// Everything the server needs once startup has succeeded.
#[derive(Debug)]
pub struct Prepared {
    pub config: GatewayConfig,
    pub routes: RouteTable,
}

/// Load configuration and apply command-line overrides.
pub fn load_configuration(options: &StartupOptions) -> Result<GatewayConfig, GatewayError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if let Some(bind_address) = &options.bind_address {
        config.listener.bind_address = bind_address.clone();
    }
    if options.skip_build {
        config.build.enabled = false;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Run the compiler against each route's script.
pub async fn build_routes(
    build: &BuildConfig,
    cgi_dir: &Path,
    routes: &[RouteConfig],
) -> Result<(), GatewayError> {
    for route in routes {
        let script = cgi_dir.join(&route.script);
        tracing::info!(compiler = %build.compiler, script = %script.display(), "Building route");

        let status = Command::new(&build.compiler)
            .args(&build.args)
            .arg(&script)
            .status()
            .await
            .map_err(|source| GatewayError::CompilerLaunch {
                script: script.clone(),
                source,
            })?;

        if !status.success() {
            return Err(GatewayError::Build { script, status });
        }
    }

    Ok(())
}

/// Every route's binary must exist before the first request.
pub fn check_executables(cgi_dir: &Path, routes: &[RouteConfig]) -> Result<(), GatewayError> {
    for route in routes {
        let binary = cgi_dir.join(&route.binary);
        if !binary.exists() {
            return Err(GatewayError::MissingExecutable(binary));
        }
    }
    Ok(())
}

/// Run the rest of the startup sequence with an already loaded `config`
/// (see [`load_configuration`]).
pub async fn prepare(
    options: &StartupOptions,
    config: GatewayConfig,
) -> Result<Prepared, GatewayError> {
    let cgi_dir = options
        .cgi_dir
        .clone()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or(GatewayError::MissingCgiDir)?;

    let routes_path = options
        .routes_path
        .clone()
        .unwrap_or_else(|| cgi_dir.join(ROUTES_FILE));
    let route_configs = load_routes(&routes_path)?;

    if config.build.enabled {
        build_routes(&config.build, &cgi_dir, &route_configs).await?;
    } else {
        tracing::info!("Build step disabled");
    }

    check_executables(&cgi_dir, &route_configs)?;

    let routes = RouteTable::from_config(&route_configs, &cgi_dir);
    tracing::info!(routes = routes.len(), cgi_dir = %cgi_dir.display(), "Route table ready");

    Ok(Prepared { config, routes })
}
