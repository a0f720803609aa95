//! Per-user artifact lists: story results and video results.
//!
//! Append is read-modify-write over the whole table. Each list is kept
//! newest-first and capped; the oldest entry falls off the end.

use super::{StorageError, Store};
use crate::constants::{limits, tables};
use crate::models::{GenerationResult, VideoResult};

impl Store {
    pub async fn stories_for_user(
        &self,
        email: &str,
    ) -> Result<Vec<GenerationResult>, StorageError> {
        let mut table = self.read_map::<Vec<GenerationResult>>(tables::STORIES).await?;
        Ok(table.remove(email).unwrap_or_default())
    }

    pub async fn push_story(
        &self,
        email: &str,
        result: GenerationResult,
    ) -> Result<(), StorageError> {
        let mut table = self.read_map::<Vec<GenerationResult>>(tables::STORIES).await?;
        let list = table.entry(email.to_string()).or_default();

        list.insert(0, result);
        if list.len() > limits::MAX_STORED_STORIES {
            list.truncate(limits::MAX_STORED_STORIES);
            tracing::debug!(email, "evicted oldest story result");
        }

        self.write_map(tables::STORIES, &table).await
    }

    pub async fn videos_for_user(&self, email: &str) -> Result<Vec<VideoResult>, StorageError> {
        let mut table = self.read_map::<Vec<VideoResult>>(tables::VIDEOS).await?;
        Ok(table.remove(email).unwrap_or_default())
    }

    pub async fn push_video(&self, email: &str, video: VideoResult) -> Result<(), StorageError> {
        let mut table = self.read_map::<Vec<VideoResult>>(tables::VIDEOS).await?;
        let list = table.entry(email.to_string()).or_default();

        list.insert(0, video);
        if list.len() > limits::MAX_STORED_VIDEOS {
            list.truncate(limits::MAX_STORED_VIDEOS);
            tracing::debug!(email, "evicted oldest video result");
        }

        self.write_map(tables::VIDEOS, &table).await
    }
}
