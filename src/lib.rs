//! Autha mock is a tiny login API serving a fixed identity directory, so
//! front ends can be built against a realistic authentication shape.

#![forbid(unsafe_code)]
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
mod middleware;
pub mod response;
pub mod router;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::FromRef;
use axum::http::{StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use auth::Authenticator;
use directory::IdentityDirectory;
pub use error::ServerError;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: axum::http::Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State backed by the built-in directory.
#[cfg(test)]
pub fn state() -> AppState {
    initialize_state(config::Configuration::default()).unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub authenticator: Authenticator,
    pub metrics: Option<PrometheusHandle>,
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Authenticator {
        state.authenticator.clone()
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let [allow_origin, allow_methods, allow_headers] = middleware::cors();

    let middleware = ServiceBuilder::new()
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Static CORS policy, on every response.
        .layer(allow_origin)
        .layer(allow_methods)
        .layer(allow_headers)
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .layer(AxumMiddleware::from_fn(middleware::preflight));

    let mut router = router::router();
    if state.metrics.is_some() {
        // `GET /metrics` goes to `render`.
        router = router.route(
            "/metrics",
            get(telemetry::render).fallback(router::not_found),
        );
    }

    router
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .fallback(router::not_found)
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
///
/// Builds the identity directory from the configuration, or from the built-in
/// identities when none are declared.
pub fn initialize_state(
    config: config::Configuration,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let records = config
        .identities
        .clone()
        .unwrap_or_else(directory::builtin);
    let directory = Arc::new(IdentityDirectory::new(records)?);

    let metrics = if config.metrics {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    Ok(AppState {
        config: Arc::new(config),
        authenticator: Authenticator::new(directory),
        metrics,
    })
}
