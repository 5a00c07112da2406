//! Identity directory.
//!
//! A fixed set of known identities, keyed by normalized email. Built once at
//! startup, then only ever read.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Errors raised while building an [`IdentityDirectory`].
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email `{0}` is declared more than once")]
    DuplicateEmail(String),
    #[error("user id must be a positive integer (found on `{0}`)")]
    InvalidId(String),
    #[error("user id {0} is declared more than once")]
    DuplicateId(u64),
}

/// Public profile returned to the client on a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub display_role: String,
    /// Reserved, never filled by this server.
    #[serde(default, skip_deserializing)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

/// Credential record of one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub email: String,
    pub password: String,
    pub profile: UserProfile,
}

/// Trim surrounding whitespace and lower-case an email so it can be used as a
/// directory key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Immutable email to identity mapping.
#[derive(Debug, Default)]
pub struct IdentityDirectory {
    records: HashMap<String, IdentityRecord>,
}

impl IdentityDirectory {
    /// Build a directory from a list of records.
    ///
    /// Emails are normalized before insertion. Duplicate emails, duplicate ids
    /// and a zero id are rejected.
    pub fn new(
        records: impl IntoIterator<Item = IdentityRecord>,
    ) -> Result<Self, DirectoryError> {
        let mut map = HashMap::new();
        let mut ids = HashSet::new();

        for mut record in records {
            record.email = normalize_email(&record.email);

            if record.email.is_empty() {
                return Err(DirectoryError::EmptyEmail);
            }
            if record.profile.id == 0 {
                return Err(DirectoryError::InvalidId(record.email));
            }
            if !ids.insert(record.profile.id) {
                return Err(DirectoryError::DuplicateId(record.profile.id));
            }
            if map.contains_key(&record.email) {
                return Err(DirectoryError::DuplicateEmail(record.email));
            }

            map.insert(record.email.clone(), record);
        }

        Ok(Self { records: map })
    }

    /// Look up an identity by an already normalized email.
    pub fn lookup(&self, email: &str) -> Option<&IdentityRecord> {
        self.records.get(email)
    }

    /// Number of known identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records, ordered by user id.
    pub fn iter(&self) -> impl Iterator<Item = &IdentityRecord> {
        let mut records = self.records.values().collect::<Vec<_>>();
        records.sort_by_key(|record| record.profile.id);
        records.into_iter()
    }
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[allow(clippy::too_many_arguments)]
fn record(
    email: &str,
    password: &str,
    id: u64,
    name: &str,
    display_name: &str,
    display_role: &str,
    cities: &[&str],
    roles: &[&str],
    permissions: &[&str],
) -> IdentityRecord {
    IdentityRecord {
        email: email.to_owned(),
        password: password.to_owned(),
        profile: UserProfile {
            id,
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            display_role: display_role.to_owned(),
            profile_photo: None,
            cities: tags(cities),
            roles: tags(roles).into_iter().collect(),
            permissions: tags(permissions).into_iter().collect(),
        },
    }
}

/// Identities served when the configuration does not declare any.
pub fn builtin() -> Vec<IdentityRecord> {
    vec![
        record(
            "admin@admin.com",
            "passer123",
            1,
            "Administrator",
            "Administrateur",
            "Administrateur Système",
            &["Dakar", "Thiès", "Saint-Louis", "Kaolack"],
            &["admin", "super_admin"],
            &[
                "manage_users",
                "manage_buses",
                "manage_tickets",
                "view_reports",
                "manage_settings",
            ],
        ),
        record(
            "manager@artluxurybus.com",
            "manager123",
            2,
            "Manager Transport",
            "Manager Transport",
            "Responsable Transport",
            &["Dakar", "Thiès"],
            &["manager"],
            &["manage_buses", "manage_tickets", "view_reports"],
        ),
        record(
            "chauffeur@artluxurybus.com",
            "chauffeur123",
            3,
            "Mamadou Diop",
            "Mamadou Diop",
            "Chauffeur",
            &["Dakar"],
            &["driver"],
            &["view_schedule", "update_status"],
        ),
        record(
            "agent@artluxurybus.com",
            "agent123",
            4,
            "Fatou Sall",
            "Fatou Sall",
            "Agent de Vente",
            &["Thiès"],
            &["agent"],
            &["sell_tickets", "view_passengers"],
        ),
    ]
}
