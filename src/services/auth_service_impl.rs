//! Key-value-store implementation of the `AuthService` trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::Store;
use crate::models::{Account, SessionUser};
use crate::services::auth_service::{AuthError, AuthService, ProfileUpdate};

pub struct StoreAuthService {
    store: Store,
}

impl StoreAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for StoreAuthService {
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        bio: Option<String>,
    ) -> Result<SessionUser, AuthError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }

        let mut accounts = self.store.accounts().await?;
        if accounts.contains_key(email) {
            return Err(AuthError::DuplicateEmail);
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            bio,
            password: password.to_string(),
        };
        let user = account.to_session_user();

        accounts.insert(email.to_string(), account);
        self.store.save_accounts(&accounts).await?;
        self.store.set_session(&user).await?;

        tracing::info!(email, "account created");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let account = self
            .store
            .get_account(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Cleartext comparison, matching the stored record.
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        let user = account.to_session_user();
        self.store.set_session(&user).await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        current_email: &str,
        update: ProfileUpdate,
    ) -> Result<SessionUser, AuthError> {
        let mut accounts = self.store.accounts().await?;

        let Some(existing) = accounts.get(current_email).cloned() else {
            return Err(AuthError::NotFound);
        };

        let email_changed = current_email != update.email;
        if email_changed && accounts.contains_key(&update.email) {
            return Err(AuthError::EmailInUse);
        }

        let updated = Account {
            id: existing.id,
            name: update.name,
            email: update.email.clone(),
            bio: update.bio,
            password: existing.password,
        };
        let user = updated.to_session_user();

        // Relocate the record when the key changed.
        if email_changed {
            accounts.remove(current_email);
        }
        accounts.insert(update.email, updated);

        self.store.save_accounts(&accounts).await?;
        self.store.set_session(&user).await?;

        Ok(user)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.store.clear_session().await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>, AuthError> {
        Ok(self.store.session().await?)
    }
}
