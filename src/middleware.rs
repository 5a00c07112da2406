//! Middlewares for routes.

use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers attached to every response, whatever the route or origin.
const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (
        ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Accept, Authorization",
    ),
];

/// Layers stamping the static CORS policy on responses.
pub fn cors() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    CORS_HEADERS.map(|(name, value)| {
        SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
    })
}

/// Answer `OPTIONS` on any path with an empty 200.
///
/// `HEAD` is not served: axum would route it to `GET` handlers.
pub async fn preflight(req: Request, next: Next) -> Response {
    match *req.method() {
        Method::OPTIONS => return StatusCode::OK.into_response(),
        Method::HEAD => return StatusCode::NOT_FOUND.into_response(),
        _ => {},
    }

    next.run(req).await
}
