//! `POST /api/auth/login`.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use serde::Deserialize;

use crate::auth::{Authenticator, LoginOutcome};
use crate::directory::normalize_email;
use crate::error::{Result, ServerError};

/// Largest accepted login body, in bytes.
pub const BODY_LIMIT: usize = 30_000;

#[derive(Debug, PartialEq, Deserialize)]
pub struct Body {
    pub email: String,
    pub password: String,
}

/// Parse a login body. Both fields are required.
pub fn parse(body: &[u8]) -> Result<Body> {
    Ok(serde_json::from_slice(body)?)
}

/// Handler to log a user in.
pub async fn handler(
    State(auth): State<Authenticator>,
    req: Request,
) -> Result<LoginOutcome> {
    let body = to_bytes(req.into_body(), BODY_LIMIT)
        .await
        .map_err(ServerError::ReadingBody)?;
    let body = parse(&body)?;
    let email = normalize_email(&body.email);
    tracing::info!(%email, "login attempt");

    let outcome = auth.authenticate(&body.email, &body.password);
    match &outcome {
        LoginOutcome::Success { profile, .. } => {
            tracing::info!(
                %email,
                user_id = profile.id,
                display_role = %profile.display_role,
                "login succeeded"
            );
            metrics::counter!("auth_login_attempts_total", "outcome" => "success")
                .increment(1);
        },
        LoginOutcome::Failure { .. } => {
            tracing::info!(%email, "login failed");
            metrics::counter!("auth_login_attempts_total", "outcome" => "failure")
                .increment(1);
        },
    }

    Ok(outcome)
}
