use serde::{Deserialize, Serialize};

use crate::models::{GenerationInputs, GenerationResult, ImageData, VideoResult};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub description: String,
    pub audience: String,
    pub platform: String,
    pub aesthetic: String,
    #[serde(default)]
    pub generate_images: bool,
    pub image: ImageData,
}

impl GenerateRequest {
    #[must_use]
    pub fn into_inputs(self) -> GenerationInputs {
        GenerationInputs {
            description: self.description,
            audience: self.audience,
            platform: self.platform,
            aesthetic: self.aesthetic,
            generate_images: self.generate_images,
            image: self.image,
        }
    }
}

/// A generation response carries the result regardless of whether the
/// save succeeded; a save failure is reported alongside, never instead.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub result: GenerationResult,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateImagesResponse {
    pub images: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated: String,
}

#[derive(Debug, Deserialize)]
pub struct StartVideoRequest {
    pub prompt: String,
    #[serde(default)]
    pub image: Option<ImageData>,
}

#[derive(Debug, Serialize)]
pub struct StartVideoResponse {
    pub job_id: uuid::Uuid,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogueEntry {
    Story(GenerationResult),
    Video(VideoResult),
}

#[derive(Debug, Serialize)]
pub struct CatalogueResponse {
    pub entries: Vec<CatalogueEntry>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
}
