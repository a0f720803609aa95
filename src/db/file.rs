use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{KvBackend, StorageError};

/// One JSON file per table under the data directory. Writes go through a
/// temp file and rename so a crash mid-write never leaves a half-written
/// table behind (a torn table would otherwise be "healed" into emptiness).
pub struct FileBackend {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>, quota_bytes: Option<u64>) -> Self {
        Self {
            root: root.into(),
            quota_bytes,
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }

    /// Total bytes the store would occupy after writing `incoming` bytes
    /// to `table`.
    async fn projected_size(&self, table: &str, incoming: u64) -> Result<u64, StorageError> {
        let mut total = incoming;
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(total),
            Err(e) => return Err(e.into()),
        };

        let skip = self.table_path(table);
        while let Some(entry) = entries.next_entry().await? {
            if entry.path() == skip {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                total += entry.metadata().await?.len();
            }
        }
        Ok(total)
    }
}

#[async_trait]
impl KvBackend for FileBackend {
    async fn read(&self, table: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.table_path(table)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, table: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes
            && self.projected_size(table, value.len() as u64).await? > quota
        {
            return Err(StorageError::Full);
        }

        fs::create_dir_all(&self.root).await?;

        let path = self.table_path(table);
        let tmp = tmp_path(&path);
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, table: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.table_path(table)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
