//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{GatewayConfig, RouteConfig, RoutesFile};
use crate::config::validation::{validate_config, validate_routes, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load and validate gateway configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = read_toml(path)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate the route file.
pub fn load_routes(path: &Path) -> Result<Vec<RouteConfig>, ConfigError> {
    let file: RoutesFile = read_toml(path)?;

    validate_routes(&file.routes).map_err(ConfigError::Validation)?;

    tracing::info!(path = %path.display(), routes = file.routes.len(), "Routes loaded");
    Ok(file.routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_routes() {
        let path = write_temp(
            "routes.toml",
            r#"
            [[routes]]
            method = "GET"
            path = "/todo"
            script = "todo.roc"
            binary = "todo"

            [[routes]]
            method = "POST"
            path = "/todo/{id}"
            script = "todo_post.roc"
            binary = "todo_post"
            "#,
        );
        let routes = load_routes(&path).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].method, "POST");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("{}-missing.toml", uuid::Uuid::new_v4()));
        assert!(matches!(load_routes(&path), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = write_temp("routes.toml", "[[routes]]\nmethod = ");
        assert!(matches!(load_routes(&path), Err(ConfigError::Parse { .. })));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let path = write_temp("gateway.toml", "[dispatch]\ntimeout_ms = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("timeout_ms"));
        fs::remove_file(path).unwrap();
    }
}
