//! Response construction.
//!
//! # Responsibilities
//! - Map dispatch outcomes to HTTP status codes
//! - Wrap subprocess output as the response body
//!
//! # Design Decisions
//! - Subprocess output is the raw body: no CGI header parsing, no
//!   Content-Type guessing
//! - Routing misses are client errors (400), not 404
//! - Timeouts are 408, every other failure is 500

use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::dispatch::DispatchOutcome;

/// Status for an outcome known before anything was sent.
pub fn status_for(outcome: &DispatchOutcome) -> StatusCode {
    match outcome {
        DispatchOutcome::Succeeded => StatusCode::OK,
        DispatchOutcome::TimedOut => StatusCode::REQUEST_TIMEOUT,
        DispatchOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// No route matched the method and path.
pub fn no_route() -> Response {
    StatusCode::BAD_REQUEST.into_response()
}

/// Response for a finished dispatch. Only success carries a body.
pub fn finished(outcome: &DispatchOutcome, output: Bytes) -> Response {
    let status = status_for(outcome);
    if status == StatusCode::OK {
        (status, Body::from(output)).into_response()
    } else {
        status.into_response()
    }
}

/// Response whose body is still being produced.
pub fn streaming(body: Body) -> Response {
    (StatusCode::OK, body).into_response()
}
