use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::clients::{GeminiClient, GenerativeService};
use crate::config::Config;
use crate::db::{FileBackend, KvBackend, Store};
use crate::services::{AuthService, GenerationService, StoreAuthService, VideoAdService};

/// Build a shared HTTP client with reasonable defaults. Reused by every
/// HTTP-backed service to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Bottega/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub generative: Arc<dyn GenerativeService>,

    pub auth_service: Arc<dyn AuthService>,

    pub generation_service: Arc<GenerationService>,

    pub video_service: Arc<VideoAdService>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.gemini.request_timeout_seconds)?;

        let backend = Arc::new(FileBackend::new(
            config.general.data_dir.clone(),
            config.storage.quota_bytes,
        ));
        let generative: Arc<dyn GenerativeService> = Arc::new(GeminiClient::with_shared_client(
            http_client,
            config.gemini.clone(),
        ));

        Ok(Self::with_parts(config, generative, backend))
    }

    /// Wires the services around explicit collaborators. Tests use this
    /// with a fake generative backend and an in-memory store.
    pub fn with_parts(
        config: Config,
        generative: Arc<dyn GenerativeService>,
        kv: Arc<dyn KvBackend>,
    ) -> Self {
        let store = Store::new(kv);

        let auth_service =
            Arc::new(StoreAuthService::new(store.clone())) as Arc<dyn AuthService>;
        let generation_service = Arc::new(GenerationService::new(generative.clone()));
        let video_service = Arc::new(VideoAdService::new(
            generative.clone(),
            store.clone(),
            Duration::from_secs(config.video.poll_interval_seconds),
            Duration::from_secs(config.video.progress_interval_seconds),
        ));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            generative,
            auth_service,
            generation_service,
            video_service,
        }
    }
}
