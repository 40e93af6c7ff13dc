//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → matcher.rs (percent-decode the path)
//!     → router.rs (ordered scan of the route table)
//!     → matcher.rs (segment-wise pattern match, placeholder extraction)
//!     → Return: MatchedRoute or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Resolve executables against the CGI directory
//!     → Stable sort by raw pattern length, longest first
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by pattern length)

pub mod matcher;
pub mod router;

pub use matcher::{decode_path, match_path, PathParams};
pub use router::{MatchedRoute, RouteDefinition, RouteTable};
