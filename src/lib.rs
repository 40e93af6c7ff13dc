//! CGI-style HTTP gateway library.
//!
//! Requests are matched against a table of method and path patterns and
//! handed to pre-built executables: metadata goes in through environment
//! variables, the body through stdin, and stdout becomes the response.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteDefinition, RouteTable};
