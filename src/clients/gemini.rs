use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{GenError, GenerativeService, VideoOperation};
use crate::config::GeminiConfig;
use crate::models::ImageData;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// REST client for the Generative Language API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    #[must_use]
    pub const fn with_shared_client(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn model_url(&self, model: &str, verb: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.base_url, model, verb, self.config.api_key
        )
    }

    /// Converts a non-success response into a typed error. Rate limiting
    /// is recognized from the HTTP status or the error payload's status
    /// code, not from message text.
    async fn classify_failure(response: reqwest::Response) -> GenError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return GenError::RateLimited;
        }

        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_default();
        if detail.status == "RESOURCE_EXHAUSTED" {
            return GenError::RateLimited;
        }

        GenError::Upstream {
            status: status.as_u16(),
            message: if detail.message.is_empty() {
                body
            } else {
                detail.message
            },
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<GenerateContentResponse, GenError> {
        let response = self
            .client
            .post(self.model_url(model, "generateContent"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        Ok(response.json().await?)
    }

    fn image_part(image: &ImageData) -> serde_json::Value {
        json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": image.base64,
            }
        })
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn generate_text_with_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> Result<String, GenError> {
        let body = json!({
            "contents": [{ "parts": [Self::image_part(image), { "text": prompt }] }],
        });

        let response = self
            .generate_content(&self.config.story_model, body)
            .await?;
        first_text(&response).ok_or(GenError::Empty)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, GenError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .generate_content(&self.config.story_model, body)
            .await?;
        first_text(&response).ok_or(GenError::Empty)
    }

    async fn generate_image(
        &self,
        image: &ImageData,
        prompt: &str,
    ) -> Result<ImageData, GenError> {
        let body = json!({
            "contents": [{ "parts": [Self::image_part(image), { "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] },
        });

        let response = self
            .generate_content(&self.config.image_model, body)
            .await?;

        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content.parts.iter().find_map(|part| {
                    part.inline_data.as_ref().map(|inline| ImageData {
                        base64: inline.data.clone(),
                        mime_type: inline.mime_type.clone(),
                    })
                })
            })
            .ok_or(GenError::Empty)
    }

    async fn start_video(
        &self,
        prompt: &str,
        seed_image: Option<&ImageData>,
    ) -> Result<VideoOperation, GenError> {
        let mut instance = json!({ "prompt": prompt });
        if let Some(image) = seed_image {
            instance["image"] = json!({
                "bytesBase64Encoded": image.base64,
                "mimeType": image.mime_type,
            });
        }

        let body = json!({
            "instances": [instance],
            "parameters": { "numberOfVideos": 1 },
        });

        let response = self
            .client
            .post(self.model_url(&self.config.video_model, "predictLongRunning"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let raw: serde_json::Value = response.json().await?;
        debug!(operation = ?raw.get("name"), "video job submitted");
        Ok(VideoOperation::from_raw(raw))
    }

    async fn poll_video(&self, op: &VideoOperation) -> Result<VideoOperation, GenError> {
        let name = op.name().ok_or(GenError::Empty)?;
        let url = format!(
            "{}/{}?key={}",
            self.config.base_url, name, self.config.api_key
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let raw: serde_json::Value = response.json().await?;
        Ok(VideoOperation::from_raw(raw))
    }

    async fn fetch_video(&self, uri: &str) -> Result<(Vec<u8>, String), GenError> {
        let response = self.client.get(self.download_url(uri)).send().await?;
        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("video/mp4")
            .to_string();
        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), mime))
    }

    fn download_url(&self, uri: &str) -> String {
        // The asset locator needs the API key appended to be fetchable.
        match url::Url::parse(uri) {
            Ok(mut parsed) => {
                parsed
                    .query_pairs_mut()
                    .append_pair("key", &self.config.api_key);
                parsed.to_string()
            }
            Err(_) => uri.to_string(),
        }
    }
}

fn first_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| {
            content
                .parts
                .iter()
                .find_map(|part| part.text.as_deref())
        })
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_reports_done_and_uri() {
        let op = VideoOperation::from_raw(serde_json::json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [
                        { "video": { "uri": "https://example.com/v.mp4" } }
                    ]
                }
            }
        }));

        assert!(op.is_done());
        assert_eq!(op.name(), Some("models/veo/operations/abc"));
        assert_eq!(op.video_uri().as_deref(), Some("https://example.com/v.mp4"));
    }

    #[test]
    fn pending_operation_has_no_uri() {
        let op = VideoOperation::from_raw(serde_json::json!({
            "name": "models/veo/operations/abc"
        }));

        assert!(!op.is_done());
        assert!(op.video_uri().is_none());
    }

    #[test]
    fn done_without_asset_yields_none() {
        let op = VideoOperation::from_raw(serde_json::json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {}
        }));

        assert!(op.is_done());
        assert!(op.video_uri().is_none());
    }

    #[test]
    fn download_url_appends_key() {
        let config = GeminiConfig {
            api_key: "k123".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::with_shared_client(Client::new(), config);

        let url = client.download_url("https://example.com/file.mp4?alt=media");
        assert!(url.contains("alt=media"));
        assert!(url.contains("key=k123"));
    }
}
