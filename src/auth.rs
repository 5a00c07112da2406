//! Login authenticator.
//!
//! Decides whether a submitted email/password pair matches a known identity
//! and shapes the result into a [`LoginOutcome`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::directory::{IdentityDirectory, UserProfile, normalize_email};

pub const TOKEN_TYPE: &str = "Bearer";
const TOKEN_PREFIX: &str = "real-token";
const FINGERPRINT_RANGE: u64 = 10_000;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Top-level message of a credential mismatch.
pub const MISMATCH_MESSAGE: &str = "Identifiants incorrects";
/// Field error attached to `email` on a credential mismatch.
pub const MISMATCH_DETAIL: &str =
    "Ces identifiants ne correspondent pas à nos enregistrements.";
const EMAIL_FIELD: &str = "email";

/// Result of one authentication attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success {
        email: String,
        profile: UserProfile,
        token: String,
    },
    Failure {
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },
}

impl LoginOutcome {
    /// Credential mismatch, always blamed on the `email` field so callers
    /// cannot tell an unknown account from a wrong password.
    fn mismatch() -> Self {
        LoginOutcome::Failure {
            message: MISMATCH_MESSAGE.to_owned(),
            field_errors: BTreeMap::from([(
                EMAIL_FIELD.to_owned(),
                vec![MISMATCH_DETAIL.to_owned()],
            )]),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }
}

/// 64-bit FNV-1a over the UTF-8 bytes of `email`, reduced to `0..10000`.
///
/// Stable across runs and platforms. Not collision resistant: two emails can
/// share a fingerprint.
pub fn fingerprint(email: &str) -> u64 {
    let hash = email.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });

    hash % FINGERPRINT_RANGE
}

/// Build the display token handed out on success. It is never verified.
pub fn issue_token(id: u64, email: &str) -> String {
    format!("{TOKEN_PREFIX}-{id}-{}", fingerprint(email))
}

/// Checks credentials against a shared [`IdentityDirectory`].
#[derive(Debug, Clone)]
pub struct Authenticator {
    directory: Arc<IdentityDirectory>,
}

impl Authenticator {
    /// Create a new [`Authenticator`].
    pub fn new(directory: Arc<IdentityDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    /// Authenticate a raw email and password.
    ///
    /// The email is trimmed and lower-cased before lookup; the password is
    /// compared byte for byte.
    pub fn authenticate(&self, raw_email: &str, password: &str) -> LoginOutcome {
        let email = normalize_email(raw_email);

        match self.directory.lookup(&email) {
            Some(record) if record.password == password => {
                LoginOutcome::Success {
                    token: issue_token(record.profile.id, &email),
                    profile: record.profile.clone(),
                    email,
                }
            },
            _ => LoginOutcome::mismatch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::builtin;

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(
            IdentityDirectory::new(builtin()).unwrap(),
        ))
    }

    #[test]
    fn test_known_credentials() {
        let auth = authenticator();

        for record in builtin() {
            match auth.authenticate(&record.email, &record.password) {
                LoginOutcome::Success {
                    email,
                    profile,
                    token,
                } => {
                    assert_eq!(email, record.email);
                    assert_eq!(profile, record.profile);
                    assert_eq!(
                        token,
                        format!(
                            "real-token-{}-{}",
                            profile.id,
                            fingerprint(&record.email)
                        )
                    );
                },
                outcome => panic!("unexpected outcome: {outcome:?}"),
            }
        }
    }

    #[test]
    fn test_email_is_normalized() {
        let auth = authenticator();

        let canonical = auth.authenticate("admin@admin.com", "passer123");
        let noisy = auth.authenticate("  Admin@Admin.com ", "passer123");
        assert!(canonical.is_success());
        assert_eq!(canonical, noisy);
    }

    #[test]
    fn test_password_is_exact() {
        let auth = authenticator();

        for password in ["Passer123", "passer123 ", " passer123", "passer12", ""]
        {
            assert!(!auth.authenticate("admin@admin.com", password).is_success());
        }
    }

    #[test]
    fn test_failures_do_not_enumerate() {
        let auth = authenticator();

        let wrong_password = auth.authenticate("admin@admin.com", "wrong");
        let unknown_user = auth.authenticate("nouser@x.com", "anything");
        let unknown_with_known_password =
            auth.authenticate("nouser@x.com", "passer123");

        assert_eq!(wrong_password, unknown_user);
        assert_eq!(unknown_user, unknown_with_known_password);

        let LoginOutcome::Failure {
            message,
            field_errors,
        } = wrong_password
        else {
            panic!("expected a failure");
        };
        assert_eq!(message, MISMATCH_MESSAGE);
        assert_eq!(field_errors.len(), 1);
        assert_eq!(field_errors[EMAIL_FIELD], [MISMATCH_DETAIL]);
    }

    #[test]
    fn test_fingerprint() {
        // Known FNV-1a 64 vectors.
        assert_eq!(fingerprint(""), 0xcbf2_9ce4_8422_2325 % 10_000);
        assert_eq!(fingerprint("a"), 0xaf63_dc4c_8601_ec8c % 10_000);

        for record in builtin() {
            let value = fingerprint(&record.email);
            assert!(value < FINGERPRINT_RANGE);
            assert_eq!(value, fingerprint(&record.email));
        }
    }

    #[test]
    fn test_empty_directory() {
        let auth =
            Authenticator::new(Arc::new(IdentityDirectory::default()));
        assert!(!auth.authenticate("admin@admin.com", "passer123").is_success());
    }
}
