//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use bottega::clients::{GenError, GenerativeService, VideoOperation};
use bottega::models::ImageData;

/// What the next status check should report.
pub enum PollStep {
    Pending,
    DoneWithUri(String),
    DoneNoUri,
    Error,
}

/// Scriptable stand-in for the generative service. Text and image calls
/// return canned payloads; video polling walks a preset plan.
pub struct FakeGenerative {
    pub story: String,
    pub fail_start: bool,
    pub rate_limit_start: bool,
    pub fetch_ok: bool,
    pub poll_plan: Mutex<VecDeque<PollStep>>,
    pub polls: AtomicUsize,
}

impl Default for FakeGenerative {
    fn default() -> Self {
        Self {
            story: "A story about craftsmanship.\n\n#Handmade #ArtisanCraft".to_string(),
            fail_start: false,
            rate_limit_start: false,
            fetch_ok: true,
            poll_plan: Mutex::new(VecDeque::new()),
            polls: AtomicUsize::new(0),
        }
    }
}

impl FakeGenerative {
    pub fn with_poll_plan(steps: Vec<PollStep>) -> Self {
        Self {
            poll_plan: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeService for FakeGenerative {
    async fn generate_text_with_image(
        &self,
        _image: &ImageData,
        _prompt: &str,
    ) -> Result<String, GenError> {
        Ok(self.story.clone())
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, GenError> {
        Ok("storia tradotta #Handmade".to_string())
    }

    async fn generate_image(
        &self,
        _image: &ImageData,
        _prompt: &str,
    ) -> Result<ImageData, GenError> {
        Ok(ImageData {
            base64: "Z2VuZXJhdGVk".to_string(),
            mime_type: "image/png".to_string(),
        })
    }

    async fn start_video(
        &self,
        _prompt: &str,
        _seed_image: Option<&ImageData>,
    ) -> Result<VideoOperation, GenError> {
        if self.rate_limit_start {
            return Err(GenError::RateLimited);
        }
        if self.fail_start {
            return Err(GenError::Upstream {
                status: 500,
                message: "backend exploded".to_string(),
            });
        }
        Ok(VideoOperation::from_raw(json!({
            "name": "models/veo/operations/test-op"
        })))
    }

    async fn poll_video(&self, op: &VideoOperation) -> Result<VideoOperation, GenError> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let step = self.poll_plan.lock().unwrap().pop_front();
        match step {
            None | Some(PollStep::Pending) => Ok(op.clone()),
            Some(PollStep::DoneWithUri(uri)) => Ok(VideoOperation::from_raw(json!({
                "name": "models/veo/operations/test-op",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [ { "video": { "uri": uri } } ]
                    }
                }
            }))),
            Some(PollStep::DoneNoUri) => Ok(VideoOperation::from_raw(json!({
                "name": "models/veo/operations/test-op",
                "done": true,
                "response": {}
            }))),
            Some(PollStep::Error) => Err(GenError::Upstream {
                status: 500,
                message: "status check failed".to_string(),
            }),
        }
    }

    async fn fetch_video(&self, _uri: &str) -> Result<(Vec<u8>, String), GenError> {
        if self.fetch_ok {
            Ok((b"fake-video-bytes".to_vec(), "video/mp4".to_string()))
        } else {
            Err(GenError::Upstream {
                status: 403,
                message: "download denied".to_string(),
            })
        }
    }

    fn download_url(&self, uri: &str) -> String {
        format!("{uri}&key=test-key")
    }
}

pub fn sample_image() -> ImageData {
    ImageData {
        base64: "cHJvZHVjdA==".to_string(),
        mime_type: "image/jpeg".to_string(),
    }
}
