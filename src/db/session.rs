use super::{StorageError, Store};
use crate::constants::tables;
use crate::models::SessionUser;

impl Store {
    /// The persisted projection of the active session, if any.
    pub async fn session(&self) -> Result<Option<SessionUser>, StorageError> {
        self.read_value(tables::SESSION).await
    }

    pub async fn set_session(&self, user: &SessionUser) -> Result<(), StorageError> {
        self.write_value(tables::SESSION, user).await
    }

    pub async fn clear_session(&self) -> Result<(), StorageError> {
        self.remove_table(tables::SESSION).await
    }
}
