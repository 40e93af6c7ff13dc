//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that every route names a method, pattern, script and binary
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pattern syntax is not checked; the matcher treats anything it does
//!   not recognise as a literal segment

use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, RouteConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate the gateway configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.dispatch.timeout_ms == 0 {
        errors.push(ValidationError::new("dispatch.timeout_ms", "must be greater than zero"));
    }

    if config.dispatch.read_buffer_size == 0 {
        errors.push(ValidationError::new(
            "dispatch.read_buffer_size",
            "must be greater than zero",
        ));
    }

    if config.build.enabled && config.build.compiler.trim().is_empty() {
        errors.push(ValidationError::new(
            "build.compiler",
            "must be set when the build step is enabled",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate route entries from the route file.
pub fn validate_routes(routes: &[RouteConfig]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (i, route) in routes.iter().enumerate() {
        let fields = [
            ("method", &route.method),
            ("path", &route.path),
            ("script", &route.script),
            ("binary", &route.binary),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                errors.push(ValidationError::new(
                    format!("routes[{}].{}", i, name),
                    "must not be empty",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
