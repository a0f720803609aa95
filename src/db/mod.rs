//! Browser-style key-value persistence: a handful of named tables, each
//! holding one JSON document, addressed through a swappable backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub mod accounts;
pub mod artifacts;
pub mod file;
pub mod memory;
pub mod session;

pub use file::FileBackend;
pub use memory::MemoryBackend;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused the write for capacity reasons. Surfaced to the
    /// caller as a save failure; already-displayed results stay valid.
    #[error("storage is full")]
    Full,

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("failed to encode table '{table}': {message}")]
    Serialize { table: String, message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        // ENOSPC from the filesystem is the moral equivalent of a browser
        // quota rejection.
        if err.raw_os_error() == Some(28) {
            Self::Full
        } else {
            Self::Io(err.to_string())
        }
    }
}

/// Raw string/string storage underneath [`Store`]. One real implementation
/// ([`FileBackend`]) and one in-memory stand-in ([`MemoryBackend`]) for
/// deterministic tests.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn read(&self, table: &str) -> Result<Option<String>, StorageError>;

    async fn write(&self, table: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, table: &str) -> Result<(), StorageError>;
}

/// Typed access to the logical tables. Reads of corrupt data self-heal:
/// the stored value is discarded and an empty table substituted.
///
/// Appends are read-modify-write over the whole table with no
/// concurrent-writer protection; two overlapping flows race and the last
/// writer wins.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KvBackend>,
}

impl Store {
    #[must_use]
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub(crate) async fn read_map<T: DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<HashMap<String, T>, StorageError> {
        let Some(raw) = self.backend.read(table).await? else {
            return Ok(HashMap::new());
        };

        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(table, error = %e, "discarding corrupt table");
                self.backend.remove(table).await?;
                Ok(HashMap::new())
            }
        }
    }

    pub(crate) async fn write_map<T: Serialize>(
        &self,
        table: &str,
        map: &HashMap<String, T>,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(map).map_err(|e| StorageError::Serialize {
            table: table.to_string(),
            message: e.to_string(),
        })?;
        self.backend.write(table, &raw).await
    }

    pub(crate) async fn read_value<T: DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.read(table).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(table, error = %e, "discarding corrupt table");
                self.backend.remove(table).await?;
                Ok(None)
            }
        }
    }

    pub(crate) async fn write_value<T: Serialize>(
        &self,
        table: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
            table: table.to_string(),
            message: e.to_string(),
        })?;
        self.backend.write(table, &raw).await
    }

    pub(crate) async fn remove_table(&self, table: &str) -> Result<(), StorageError> {
        self.backend.remove(table).await
    }
}
