use std::collections::HashMap;

use super::{StorageError, Store};
use crate::constants::tables;
use crate::models::Account;

impl Store {
    /// Full accounts table, keyed by email.
    pub async fn accounts(&self) -> Result<HashMap<String, Account>, StorageError> {
        self.read_map(tables::ACCOUNTS).await
    }

    pub async fn save_accounts(
        &self,
        accounts: &HashMap<String, Account>,
    ) -> Result<(), StorageError> {
        self.write_map(tables::ACCOUNTS, accounts).await
    }

    pub async fn get_account(&self, email: &str) -> Result<Option<Account>, StorageError> {
        Ok(self.accounts().await?.remove(email))
    }
}
