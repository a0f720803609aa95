use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, StartVideoRequest, StartVideoResponse};
use crate::api::auth::get_session_user;
use crate::services::JobSnapshot;

/// POST /video
/// Submit a video-ad job; the poller runs server-side and the returned
/// id is used to follow it. Submitting again replaces the caller's
/// previous job.
pub async fn start_video(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<StartVideoRequest>,
) -> Result<Json<ApiResponse<StartVideoResponse>>, ApiError> {
    if payload.prompt.is_empty() {
        return Err(ApiError::validation(
            "Please provide a prompt for your video ad.",
        ));
    }

    let user = get_session_user(&session).await?;
    let job_id = state
        .video()
        .start(Some(user), payload.prompt, payload.image);

    Ok(Json(ApiResponse::success(StartVideoResponse { job_id })))
}

/// GET /video/{id}
/// Current phase, rotating progress message, and the handles once ready.
/// Jobs are visible only to the identity that submitted them.
pub async fn video_status(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobSnapshot>>, ApiError> {
    let user = get_session_user(&session).await?;

    state
        .video()
        .snapshot(id, Some(&user.email))
        .map(|snapshot| Json(ApiResponse::success(snapshot)))
        .ok_or_else(|| ApiError::NotFound(format!("Video job {id} not found")))
}

/// GET /video/{id}/asset
/// The local playback copy. Absent when the fetch failed; the download
/// URL in the status payload still works in that case.
pub async fn video_asset(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = get_session_user(&session).await?;

    let (bytes, mime) = state
        .video()
        .asset(id, Some(&user.email))
        .ok_or_else(|| ApiError::NotFound(format!("No playable asset for video job {id}")))?;

    Ok(([(header::CONTENT_TYPE, mime)], bytes))
}

/// DELETE /video/{id}
/// "Start over": stop both timers and discard local state. The remote
/// job is not cancelled. Discarding someone else's job is a no-op.
pub async fn discard_video(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = get_session_user(&session).await?;

    state.video().restart(id, Some(&user.email));
    Ok((StatusCode::OK, "Discarded"))
}
