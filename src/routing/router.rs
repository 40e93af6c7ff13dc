//! Route table and lookup.
//!
//! # Responsibilities
//! - Store route definitions in specificity order
//! - Look up the matching route for a method and path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Specificity is approximated by raw pattern length, longest first.
//!   A long literal pattern can outrank a shorter, more specific one.
//! - Stable sort: equal lengths keep configuration order
//! - O(n) scan; route tables are small and configuration-driven

use std::path::{Path, PathBuf};

use crate::config::RouteConfig;
use crate::routing::matcher::{match_path, PathParams};

/// One route: a method and path pattern bound to an executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub method: String,
    pub path: String,
    /// Build-time script reference, exported to the child as `SCRIPT_NAME`.
    pub script: String,
    pub executable: PathBuf,
}

impl RouteDefinition {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        script: impl Into<String>,
        executable: impl Into<PathBuf>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            script: script.into(),
            executable: executable.into(),
        }
    }

    /// Resolve a configured route against the CGI directory.
    pub fn from_config(config: &RouteConfig, cgi_dir: &Path) -> Self {
        Self::new(
            config.method.clone(),
            config.path.clone(),
            config.script.clone(),
            cgi_dir.join(&config.binary),
        )
    }
}

/// A route selected for one request, with its extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute<'a> {
    pub route: &'a RouteDefinition,
    pub params: PathParams,
}

/// Ordered, read-only collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    /// Build the table, sorting by descending raw pattern length.
    pub fn load(mut routes: Vec<RouteDefinition>) -> Self {
        routes.sort_by(|a, b| b.path.len().cmp(&a.path.len()));

        for route in &routes {
            tracing::debug!(
                method = %route.method,
                path = %route.path,
                executable = %route.executable.display(),
                "Route registered"
            );
        }

        Self { routes }
    }

    /// Build the table from route file entries.
    pub fn from_config(routes: &[RouteConfig], cgi_dir: &Path) -> Self {
        Self::load(
            routes
                .iter()
                .map(|r| RouteDefinition::from_config(r, cgi_dir))
                .collect(),
        )
    }

    /// Find the first route whose pattern matches `path` and whose method
    /// equals `method` exactly.
    pub fn resolve(&self, method: &str, path: &str) -> Option<MatchedRoute<'_>> {
        self.routes.iter().find_map(|route| {
            let params = match_path(path, &route.path)?;
            (route.method == method).then_some(MatchedRoute { route, params })
        })
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
