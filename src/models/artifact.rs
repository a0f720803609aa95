use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image payload as carried on the wire: base64 body plus MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageData {
    pub base64: String,
    pub mime_type: String,
}

/// Snapshot of the generation form at the time a result was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationInputs {
    pub description: String,
    pub audience: String,
    pub platform: String,
    pub aesthetic: String,
    pub generate_images: bool,
    pub image: ImageData,
}

/// One finished story-generation run. Immutable once created; stored per
/// user in a newest-first list capped at
/// [`crate::constants::limits::MAX_STORED_STORIES`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationResult {
    pub story: String,
    pub images: Vec<ImageData>,
    pub inputs: GenerationInputs,
    pub created_at: DateTime<Utc>,
}

/// One finished video-ad run. Stored per user, cap
/// [`crate::constants::limits::MAX_STORED_VIDEOS`], newest evicts older.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoResult {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub video_base64: String,
    pub mime_type: String,
    pub prompt: String,
    #[serde(default)]
    pub input_image: Option<ImageData>,
    /// Keyed upstream locator, kept so a direct download stays possible
    /// even when the local copy is gone.
    pub download_uri: String,
}
