//! Error handler for the transport boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response::{FieldErrors, Failure};

pub type Result<T> = std::result::Result<T, ServerError>;

/// Title of every malformed request response.
pub const MALFORMED_MESSAGE: &str = "Erreur de traitement de la requête";
const SERVER_FIELD: &str = "server";

/// Enum representing request-level errors.
///
/// Reaching one of these means the authenticator was never called.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("error parsing request body: {0}")]
    ParsingBody(#[from] serde_json::Error),

    #[error("error reading request body: {0}")]
    ReadingBody(axum::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected malformed request");

        let errors =
            FieldErrors::from([(SERVER_FIELD.to_owned(), vec![self.to_string()])]);

        (
            StatusCode::BAD_REQUEST,
            Json(Failure::new(MALFORMED_MESSAGE, errors)),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn test_malformed_response() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let response = ServerError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Failure = serde_json::from_slice(&body).unwrap();
        assert!(!body.success);
        assert_eq!(body.message, MALFORMED_MESSAGE);
        assert_eq!(body.errors.len(), 1);
        assert!(body.errors[SERVER_FIELD][0].starts_with("error parsing request body"));
    }
}
