//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Subprocess dispatch settings.
    pub dispatch: DispatchConfig,

    /// Ahead-of-time build step settings.
    pub build: BuildConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How subprocess output reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Forward stdout as it is produced. Late failures can only drop the
    /// connection.
    #[default]
    Stream,
    /// Collect stdout until exit, then answer with an exact status.
    Buffer,
}

/// Subprocess dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Hard deadline for one subprocess, measured from request start.
    pub timeout_ms: u64,

    /// Streaming or buffered output.
    pub output_mode: OutputMode,

    /// Size of each stdout read.
    pub read_buffer_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            output_mode: OutputMode::Stream,
            read_buffer_size: 8 * 1024,
        }
    }
}

/// Build step configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Run the compiler for every route before serving.
    pub enabled: bool,

    /// Compiler executable.
    pub compiler: String,

    /// Arguments placed before the script path.
    pub args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            compiler: "roc".to_string(),
            args: vec!["build".to_string(), "--optimize".to_string()],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route as written in the route file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// HTTP method, compared case-sensitively.
    pub method: String,

    /// Path pattern; `{name}` segments are placeholders.
    pub path: String,

    /// Script handed to the compiler, relative to the CGI directory.
    pub script: String,

    /// Executable produced by the build, relative to the CGI directory.
    pub binary: String,
}

/// Contents of `routes.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RoutesFile {
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}
