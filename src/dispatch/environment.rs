//! CGI-style environment for a subprocess.
//!
//! The fixed keys come first, in a stable order, followed by one entry per
//! path parameter. Parameter names are used verbatim, so a parameter named
//! like a fixed key (`REQUEST_METHOD`) overrides it: later entries win.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, request::Parts};

use crate::routing::MatchedRoute;

/// Value exported as `SERVER_SOFTWARE`.
pub const SERVER_SOFTWARE: &str = concat!("cgi-gateway/", env!("CARGO_PKG_VERSION"));

/// Request metadata the subprocess sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub method: String,
    pub request_uri: String,
    pub query_string: String,
    pub content_length: String,
    pub content_type: String,
    pub remote_addr: String,
    pub protocol: String,
}

impl RequestMetadata {
    /// Capture metadata from the request head. Missing headers and a
    /// missing peer address become empty strings.
    pub fn from_parts(parts: &Parts) -> Self {
        let header_value = |name: header::HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            method: parts.method.to_string(),
            request_uri: parts.uri.to_string(),
            query_string: parts.uri.query().unwrap_or_default().to_string(),
            content_length: header_value(header::CONTENT_LENGTH),
            content_type: header_value(header::CONTENT_TYPE),
            remote_addr: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
                .unwrap_or_default(),
            protocol: format!("{:?}", parts.version),
        }
    }
}

/// Build the ordered environment list for one invocation.
pub fn build_environment(
    metadata: &RequestMetadata,
    matched: &MatchedRoute<'_>,
) -> Vec<(String, String)> {
    let fixed = [
        ("REQUEST_METHOD", metadata.method.as_str()),
        ("REQUEST_URI", metadata.request_uri.as_str()),
        ("QUERY_STRING", metadata.query_string.as_str()),
        ("CONTENT_LENGTH", metadata.content_length.as_str()),
        ("CONTENT_TYPE", metadata.content_type.as_str()),
        ("REMOTE_ADDR", metadata.remote_addr.as_str()),
        ("SERVER_PROTOCOL", metadata.protocol.as_str()),
        ("SERVER_SOFTWARE", SERVER_SOFTWARE),
        ("SCRIPT_NAME", matched.route.script.as_str()),
    ];

    let mut env: Vec<(String, String)> = fixed
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    env.extend(
        matched
            .params
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    env
}
