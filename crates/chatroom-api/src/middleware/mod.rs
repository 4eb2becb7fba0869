//! Middleware stack for the server
//!
//! Request tracing plus a request timeout standing in for the HTTP
//! read/write deadlines. The timeout only bounds time-to-response, so
//! upgraded WebSocket connections are unaffected.

use std::time::Duration;

use axum::{body::Body, http::Request, Router};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// How long a handler may take to produce a response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Apply middleware stack to the router
pub fn apply_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
    )
}
