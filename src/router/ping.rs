//! `GET /api/ping`, health check.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::Authenticator;
use crate::config::Configuration;
use crate::directory::IdentityDirectory;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub message: String,
    pub version: String,
    pub users_count: usize,
}

/// Static metadata about the running instance.
pub fn report(config: &Configuration, directory: &IdentityDirectory) -> Health {
    Health {
        message: config.name.clone(),
        version: config.version().to_owned(),
        users_count: directory.len(),
    }
}

pub async fn handler(
    State(config): State<Arc<Configuration>>,
    State(auth): State<Authenticator>,
) -> Json<Health> {
    Json(report(&config, auth.directory()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use super::*;
    use crate::*;

    #[tokio::test]
    async fn test_ping_handler() {
        let state = state();
        let expected = state.authenticator.directory().len();

        let response = make_request(
            app(state),
            Method::GET,
            "/api/ping",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Health = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.users_count, expected);
        assert_eq!(body.users_count, 4);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(body.message, "Art Luxury Bus API - Real Users");
    }

    #[test]
    fn test_report_follows_directory() {
        let directory = IdentityDirectory::default();
        let health = report(&Configuration::default(), &directory);
        assert_eq!(health.users_count, 0);
    }
}
