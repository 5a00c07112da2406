//! HTTP routes.
pub mod login;
pub mod ping;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::AppState;

/// Answer for unknown routes and unsupported methods.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /api/ping` goes to `ping`.
        .route("/api/ping", get(ping::handler).fallback(not_found))
        // `POST /api/auth/login` goes to `login`.
        .route("/api/auth/login", post(login::handler).fallback(not_found))
}
