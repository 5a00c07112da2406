//! JSON envelopes returned by the login endpoint.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::auth::{LoginOutcome, TOKEN_TYPE};
use crate::directory::UserProfile;

/// Field name to list of messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// User as sent to the client: the profile plus the login email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub token_type: String,
}

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
    pub message: String,
    pub data: Session,
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub success: bool,
    pub message: String,
    pub errors: FieldErrors,
}

impl Failure {
    pub fn new(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors,
        }
    }
}

/// Localized greeting sent with a successful login.
pub fn welcome(display_name: &str) -> String {
    format!("Connexion réussie! Bienvenue {display_name}")
}

impl IntoResponse for LoginOutcome {
    fn into_response(self) -> Response {
        match self {
            LoginOutcome::Success {
                email,
                profile,
                token,
            } => (
                StatusCode::OK,
                Json(Success {
                    success: true,
                    message: welcome(&profile.display_name),
                    data: Session {
                        user: User { profile, email },
                        token,
                        token_type: TOKEN_TYPE.to_owned(),
                    },
                }),
            )
                .into_response(),
            LoginOutcome::Failure {
                message,
                field_errors,
            } => (
                StatusCode::UNAUTHORIZED,
                Json(Failure::new(message, field_errors)),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use http_body_util::BodyExt;

    use super::*;
    use crate::auth::Authenticator;
    use crate::directory::{IdentityDirectory, builtin};

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(
            IdentityDirectory::new(builtin()).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_success_round_trip() {
        let outcome = authenticator().authenticate("admin@admin.com", "passer123");
        let LoginOutcome::Success { token, .. } = outcome.clone() else {
            panic!("expected a success");
        };

        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Success = serde_json::from_slice(&body).unwrap();
        assert!(body.success);
        assert_eq!(body.message, "Connexion réussie! Bienvenue Administrateur");
        assert_eq!(body.data.user.profile.id, 1);
        assert_eq!(body.data.user.email, "admin@admin.com");
        assert_eq!(
            body.data.user.profile.roles,
            BTreeSet::from(["super_admin".to_owned(), "admin".to_owned()])
        );
        assert_eq!(body.data.token, token);
        assert_eq!(body.data.token_type, TOKEN_TYPE);
    }

    #[tokio::test]
    async fn test_failure_shape() {
        let response = authenticator()
            .authenticate("admin@admin.com", "wrong")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
        assert!(!body["errors"]["email"].as_array().unwrap().is_empty());
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_profile_photo_is_explicit_null() {
        let user = User {
            profile: builtin().remove(0).profile,
            email: "admin@admin.com".into(),
        };
        let value = serde_json::to_value(user).unwrap();
        assert!(value["profile_photo"].is_null());
        assert!(value.as_object().unwrap().contains_key("profile_photo"));
        assert_eq!(value["display_role"], "Administrateur Système");
    }
}
