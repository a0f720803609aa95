//! Domain service for accounts and the active session.
//!
//! Backed by the key-value store; all operations are async to keep the
//! call contract uniform with the network-backed services.

use thiserror::Error;

use crate::db::StorageError;
use crate::models::SessionUser;

/// Errors specific to account operations. The first three are shown
/// inline on the relevant form.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("This email address is already in use by another account")]
    EmailInUse,

    #[error("Account not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Fields a profile update may change. An email change relocates the
/// stored record to the new key.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

/// Domain service trait for signup, login and profile maintenance.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is taken; the
    /// existing record is left untouched.
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        bio: Option<String>,
    ) -> Result<SessionUser, AuthError>;

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on a bad email or
    /// password.
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;

    /// Applies a profile update. Changing the email rekeys the record:
    /// the old key is removed and the account inserted under the new one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailInUse`] if the destination email belongs
    /// to a different account.
    async fn update_profile(
        &self,
        current_email: &str,
        update: ProfileUpdate,
    ) -> Result<SessionUser, AuthError>;

    /// Clears the persisted session projection.
    async fn logout(&self) -> Result<(), AuthError>;

    /// The persisted session projection, if a user is logged in.
    async fn current_user(&self) -> Result<Option<SessionUser>, AuthError>;
}
