use serde::{Deserialize, Serialize};

/// Stored account record, keyed by email in the accounts table.
///
/// The password is kept in cleartext. Known weakness; this store is not a
/// production credential system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub password: String,
}

impl Account {
    /// Projection handed to sessions and API responses. Never carries the
    /// password.
    #[must_use]
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
        }
    }
}

/// The currently authenticated account, minus credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}
