use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{KvBackend, StorageError};

/// In-memory backend with an optional byte quota. Backs tests and any
/// run that should not touch disk.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Plants a raw value directly, bypassing serialization. Lets tests
    /// stage corrupt table data.
    pub async fn put_raw(&self, table: &str, value: &str) {
        self.tables
            .lock()
            .await
            .insert(table.to_string(), value.to_string());
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn read(&self, table: &str) -> Result<Option<String>, StorageError> {
        Ok(self.tables.lock().await.get(table).cloned())
    }

    async fn write(&self, table: &str, value: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;

        if let Some(quota) = self.quota_bytes {
            let others: usize = tables
                .iter()
                .filter(|(name, _)| name.as_str() != table)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                return Err(StorageError::Full);
            }
        }

        tables.insert(table.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, table: &str) -> Result<(), StorageError> {
        self.tables.lock().await.remove(table);
        Ok(())
    }
}
