//! Clients for the external generative AI service.
//!
//! The seam is the [`GenerativeService`] trait: one real implementation
//! ([`gemini::GeminiClient`]) talking REST, and fake implementations in
//! tests so the orchestration layers can be exercised without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ImageData;

pub mod gemini;

pub use gemini::GeminiClient;

/// Errors from the generative service. Classification happens once, here,
/// from the HTTP status and the API error payload; callers branch on the
/// variant instead of sniffing message text.
#[derive(Debug, Error)]
pub enum GenError {
    /// The service asked us to back off (HTTP 429 or a resource-exhausted
    /// error status). Surfaced to users as "wait and try again", distinct
    /// from generic failure. No automatic retry.
    #[error("rate limited by the generative service")]
    RateLimited,

    #[error("generative service error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The call succeeded but carried no usable payload.
    #[error("generative service returned no usable content")]
    Empty,

    #[error("request to generative service failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenError {
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Opaque handle for a long-running video job. The internal shape belongs
/// to the service: we keep the raw document, re-submit it on every status
/// check, and replace it wholesale with the response. Only `done` and the
/// asset locator are ever inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoOperation(serde_json::Value);

impl VideoOperation {
    #[must_use]
    pub const fn from_raw(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    /// Server-side resource name used to address the status endpoint.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(|v| v.as_str())
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.0
            .get("done")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Asset locator, present only on successful completion. The response
    /// shape has shifted across service versions, so both known layouts
    /// are probed.
    #[must_use]
    pub fn video_uri(&self) -> Option<String> {
        let response = self.0.get("response")?;

        let candidates = [
            response
                .pointer("/generateVideoResponse/generatedSamples/0/video/uri"),
            response.pointer("/generatedVideos/0/video/uri"),
        ];

        candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Contract with the generative backend. All calls are fallible with no
/// automatic retry.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Text generation conditioned on an image and a prompt.
    async fn generate_text_with_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> Result<String, GenError>;

    /// Text-only generation (used for translation).
    async fn generate_text(&self, prompt: &str) -> Result<String, GenError>;

    /// Image editing/generation from a source image and a prompt.
    async fn generate_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> Result<ImageData, GenError>;

    /// Submits a video-generation job and returns its initial handle.
    async fn start_video(
        &self,
        prompt: &str,
        seed_image: Option<&ImageData>,
    ) -> Result<VideoOperation, GenError>;

    /// Refreshes a job handle. The returned operation replaces the one
    /// passed in.
    async fn poll_video(&self, op: &VideoOperation) -> Result<VideoOperation, GenError>;

    /// Downloads the finished asset; returns bytes and MIME type.
    async fn fetch_video(&self, uri: &str) -> Result<(Vec<u8>, String), GenError>;

    /// The locator with whatever upstream access credential it needs
    /// appended, suitable for a direct download link.
    fn download_url(&self, uri: &str) -> String;
}
