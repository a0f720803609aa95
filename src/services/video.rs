//! Long-running video-ad jobs: submit, poll, fetch, persist.
//!
//! Each job is driven by two independently cancellable tasks sharing one
//! stop signal: the driver (submit, poll on a fixed interval, fetch) and
//! a progress-message rotator that exists purely for user feedback. Both
//! are torn down when polling stops, on restart, and when the service is
//! dropped. The poller has no timeout of its own; it runs until the
//! service reports completion, a poll errors, or the user starts over.
//! Starting over never cancels the outstanding remote job.
//!
//! Each identity holds at most one job: a fresh submission supersedes
//! the submitter's previous entry, releasing its tasks and any local
//! playback copy. Job lookups are scoped to the owning identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine as _;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{GenError, GenerativeService};
use crate::db::Store;
use crate::models::{ImageData, SessionUser, VideoResult};
use crate::services::generation::build_video_prompt;

const LOADING_MESSAGES: &[&str] = &[
    "Warming up the cameras...",
    "Scouting for the perfect location...",
    "Directing the scene...",
    "Adding special effects...",
    "Rendering the final cut...",
    "This can take a few minutes, hang tight!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoPhase {
    Submitting,
    Polling,
    Fetching,
    Ready,
    Failed,
}

struct JobState {
    phase: VideoPhase,
    progress_message: String,
    error: Option<String>,
    rate_limited: bool,
    /// Raw asset locator, kept even when the local fetch fails.
    download_uri: Option<String>,
    /// Local playback copy; released when the job entry is dropped.
    asset: Option<(Vec<u8>, String)>,
    asset_note: Option<String>,
}

impl JobState {
    fn new() -> Self {
        Self {
            phase: VideoPhase::Submitting,
            progress_message: LOADING_MESSAGES[0].to_string(),
            error: None,
            rate_limited: false,
            download_uri: None,
            asset: None,
            asset_note: None,
        }
    }
}

/// Point-in-time view of a job, safe to serialize into a status response.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub phase: VideoPhase,
    pub progress_message: String,
    pub error: Option<String>,
    pub rate_limited: bool,
    pub asset_available: bool,
    pub asset_note: Option<String>,
    pub download_url: Option<String>,
}

struct JobEntry {
    /// Email of the submitting identity; `None` for anonymous jobs.
    owner: Option<String>,
    state: Arc<Mutex<JobState>>,
    stop: watch::Sender<bool>,
    driver: JoinHandle<()>,
    messenger: JoinHandle<()>,
}

impl JobEntry {
    fn teardown(&self) {
        let _ = self.stop.send(true);
        self.driver.abort();
        self.messenger.abort();
    }
}

pub struct VideoAdService {
    backend: Arc<dyn GenerativeService>,
    store: Store,
    poll_interval: Duration,
    progress_interval: Duration,
    jobs: Mutex<HashMap<Uuid, JobEntry>>,
}

impl VideoAdService {
    #[must_use]
    pub fn new(
        backend: Arc<dyn GenerativeService>,
        store: Store,
        poll_interval: Duration,
        progress_interval: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            poll_interval,
            progress_interval,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Submits a new job and returns its id. The identity is passed in
    /// explicitly; when absent the finished video is not persisted. Any
    /// previous job by the same identity is torn down first, so the
    /// registry holds at most one entry per identity.
    pub fn start(
        &self,
        user: Option<SessionUser>,
        brief: String,
        seed_image: Option<ImageData>,
    ) -> Uuid {
        let owner = user.as_ref().map(|u| u.email.clone());

        let id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(JobState::new()));
        let (stop_tx, stop_rx) = watch::channel(false);

        let messenger = tokio::spawn(rotate_messages(
            state.clone(),
            self.progress_interval,
            stop_rx,
        ));
        let driver = tokio::spawn(drive(
            self.backend.clone(),
            self.store.clone(),
            state.clone(),
            stop_tx.clone(),
            self.poll_interval,
            user,
            brief,
            seed_image,
        ));

        let mut jobs = self.jobs.lock().unwrap();
        jobs.retain(|prior, entry| {
            if entry.owner == owner {
                entry.teardown();
                info!(job = %prior, "video job superseded");
                false
            } else {
                true
            }
        });
        jobs.insert(
            id,
            JobEntry {
                owner,
                state,
                stop: stop_tx,
                driver,
                messenger,
            },
        );

        info!(job = %id, "video job started");
        id
    }

    #[must_use]
    pub fn snapshot(&self, id: Uuid, owner: Option<&str>) -> Option<JobSnapshot> {
        let jobs = self.jobs.lock().unwrap();
        let entry = jobs.get(&id).filter(|e| e.owner.as_deref() == owner)?;
        let state = entry.state.lock().unwrap();

        Some(JobSnapshot {
            id,
            phase: state.phase,
            progress_message: state.progress_message.clone(),
            error: state.error.clone(),
            rate_limited: state.rate_limited,
            asset_available: state.asset.is_some(),
            asset_note: state.asset_note.clone(),
            download_url: state
                .download_uri
                .as_deref()
                .map(|uri| self.backend.download_url(uri)),
        })
    }

    /// The local playback copy, if the fetch succeeded.
    #[must_use]
    pub fn asset(&self, id: Uuid, owner: Option<&str>) -> Option<(Vec<u8>, String)> {
        let jobs = self.jobs.lock().unwrap();
        let entry = jobs.get(&id).filter(|e| e.owner.as_deref() == owner)?;
        let state = entry.state.lock().unwrap();
        state.asset.clone()
    }

    /// "Start over": stops both timers, discards in-flight state and the
    /// local playback copy. The remote job, if still running, is left to
    /// finish on its own. Only the owning identity can discard a job.
    pub fn restart(&self, id: Uuid, owner: Option<&str>) -> bool {
        let mut jobs = self.jobs.lock().unwrap();
        if !jobs
            .get(&id)
            .is_some_and(|e| e.owner.as_deref() == owner)
        {
            return false;
        }

        if let Some(entry) = jobs.remove(&id) {
            entry.teardown();
            info!(job = %id, "video job discarded");
        }
        true
    }
}

impl Drop for VideoAdService {
    fn drop(&mut self) {
        if let Ok(jobs) = self.jobs.lock() {
            for entry in jobs.values() {
                entry.teardown();
            }
        }
    }
}

/// Rotates the user-facing progress message. Carries no job state; exits
/// on the shared stop signal.
async fn rotate_messages(
    state: Arc<Mutex<JobState>>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let mut index = 0usize;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                index = (index + 1) % LOADING_MESSAGES.len();
                state.lock().unwrap().progress_message = LOADING_MESSAGES[index].to_string();
            }
            _ = stop.changed() => break,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn drive(
    backend: Arc<dyn GenerativeService>,
    store: Store,
    state: Arc<Mutex<JobState>>,
    stop: watch::Sender<bool>,
    poll_interval: Duration,
    user: Option<SessionUser>,
    brief: String,
    seed_image: Option<ImageData>,
) {
    let prompt = build_video_prompt(&brief);

    let mut op = match backend.start_video(&prompt, seed_image.as_ref()).await {
        Ok(op) => op,
        Err(e) => {
            fail(
                &state,
                &stop,
                &e,
                "Failed to start video generation. Please try again.",
            );
            return;
        }
    };

    state.lock().unwrap().phase = VideoPhase::Polling;

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; wait a full interval before the
    // first status check.
    ticker.tick().await;

    let uri = loop {
        ticker.tick().await;

        match backend.poll_video(&op).await {
            Ok(updated) => {
                op = updated;
                if op.is_done() {
                    match op.video_uri() {
                        Some(uri) => break uri,
                        None => {
                            warn!("video job reported done without an asset locator");
                            fail_plain(
                                &state,
                                &stop,
                                "Video generation completed, but we couldn't retrieve the video. Please try again.",
                            );
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                fail(
                    &state,
                    &stop,
                    &e,
                    "An error occurred while checking video status. Please try again.",
                );
                return;
            }
        }
    };

    // Polling is over either way; tear the message timer down before the
    // fetch begins.
    let _ = stop.send(true);
    {
        let mut s = state.lock().unwrap();
        s.phase = VideoPhase::Fetching;
        s.download_uri = Some(uri.clone());
    }

    match backend.fetch_video(&uri).await {
        Ok((bytes, mime)) => {
            if let Some(user) = user {
                let video = VideoResult {
                    id: Uuid::new_v4().to_string(),
                    created_at: Utc::now(),
                    video_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
                    mime_type: mime.clone(),
                    prompt: brief,
                    input_image: seed_image,
                    download_uri: backend.download_url(&uri),
                };
                // A failed save is reported, not fatal; the finished video
                // is still playable from memory.
                if let Err(e) = store.push_video(&user.email, video).await {
                    warn!(email = %user.email, error = %e, "failed to save video to catalogue");
                }
            }

            let mut s = state.lock().unwrap();
            s.asset = Some((bytes, mime));
            s.phase = VideoPhase::Ready;
        }
        Err(e) => {
            warn!(error = %e, "failed to fetch generated video");
            // Deliberate partial success: playback is unavailable but the
            // keyed locator still works as a direct download.
            let mut s = state.lock().unwrap();
            s.asset_note = Some(
                "Could not load the generated video for playback. You can still try to download it."
                    .to_string(),
            );
            s.phase = VideoPhase::Ready;
        }
    }
}

fn fail(state: &Mutex<JobState>, stop: &watch::Sender<bool>, err: &GenError, generic: &str) {
    warn!(error = %err, "video job failed");
    let message = if err.is_rate_limited() {
        "Request limit exceeded. Please wait and try again."
    } else {
        generic
    };

    let _ = stop.send(true);
    let mut s = state.lock().unwrap();
    s.phase = VideoPhase::Failed;
    s.rate_limited = err.is_rate_limited();
    s.error = Some(message.to_string());
}

fn fail_plain(state: &Mutex<JobState>, stop: &watch::Sender<bool>, message: &str) {
    let _ = stop.send(true);
    let mut s = state.lock().unwrap();
    s.phase = VideoPhase::Failed;
    s.error = Some(message.to_string());
}
