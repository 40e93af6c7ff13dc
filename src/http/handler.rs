//! The catch-all request handler.
//!
//! Resolves the route, dispatches the subprocess and turns the outcome into
//! a response. Every request logs method, URI, status and elapsed time.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tokio::time::Instant;
use tracing::Instrument;

use crate::dispatch::{DispatchOutcome, Dispatched, RequestMetadata};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::decode_path;

/// Route label used in metrics when nothing matched.
const NO_ROUTE: &str = "none";

pub async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    let uri = parts.uri.to_string();

    // REQUEST_URI stays as sent; only matching sees the decoded path.
    let path = decode_path(parts.uri.path());
    let Some(matched) = state.routes.resolve(&method, &path) else {
        tracing::debug!(method = %method, path = %path, "No route matched");
        record(&method, &uri, NO_ROUTE, StatusCode::BAD_REQUEST, started);
        return response::no_route();
    };

    let route = matched.route.path.clone();
    let metadata = RequestMetadata::from_parts(&parts);

    match state
        .dispatcher
        .dispatch(&matched, &metadata, body, started)
        .await
    {
        Dispatched::Finished { outcome, body } => {
            report_outcome(&outcome, &route);
            let response = response::finished(&outcome, body);
            record(&method, &uri, &route, response.status(), started);
            response
        }
        Dispatched::Streaming { body, outcome } => {
            tokio::spawn(
                async move {
                    let outcome = outcome.await.unwrap_or_else(|_| {
                        DispatchOutcome::Failed("supervisor exited without an outcome".into())
                    });
                    report_outcome(&outcome, &route);
                    // Headers went out as 200; a late failure shows up only
                    // as a dropped connection.
                    record(&method, &uri, &route, StatusCode::OK, started);
                }
                .in_current_span(),
            );
            response::streaming(body)
        }
    }
}

fn report_outcome(outcome: &DispatchOutcome, route: &str) {
    metrics::record_outcome(outcome.as_str());

    match outcome {
        DispatchOutcome::Succeeded => {}
        DispatchOutcome::TimedOut => {
            tracing::warn!(route = %route, "Subprocess timed out, killed");
        }
        DispatchOutcome::Failed(error) => {
            tracing::error!(route = %route, error = %error, "Subprocess failed");
        }
    }
}

fn record(method: &str, uri: &str, route: &str, status: StatusCode, started: Instant) {
    let elapsed = started.elapsed();
    metrics::record_request(method, status.as_u16(), route, elapsed);
    tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Request complete"
    );
}
