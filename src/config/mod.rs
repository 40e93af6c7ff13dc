//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml (optional)          <cgi_dir>/routes.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig / Vec<RouteConfig> (validated, immutable)
//!     → handed to startup, which builds the route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All gateway fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::BuildConfig;
pub use schema::DispatchConfig;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::OutputMode;
pub use schema::RouteConfig;
