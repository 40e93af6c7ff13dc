//! Startup errors. Any of these stops the gateway before it serves traffic.

use std::path::PathBuf;
use std::process::ExitStatus;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("CGI directory not set (use --cgi-dir or CGI_DIR)")]
    MissingCgiDir,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to run compiler for {script}: {source}")]
    CompilerLaunch {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to build {script}: compiler exited with {status}")]
    Build { script: PathBuf, status: ExitStatus },

    #[error("expected binary {0} does not exist")]
    MissingExecutable(PathBuf),

    #[error("metrics exporter failed: {0}")]
    Metrics(String),

    #[error("HTTP server failed: {0}")]
    Io(#[from] std::io::Error),
}
