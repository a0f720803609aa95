use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, CatalogueEntry, CatalogueResponse};
use crate::api::auth::get_session_user;

/// GET /catalogue
/// Combined per-user history: story and video results interleaved by
/// recency, newest first.
pub async fn get_catalogue(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<CatalogueResponse>>, ApiError> {
    let user = get_session_user(&session).await?;

    let stories = state
        .store()
        .stories_for_user(&user.email)
        .await
        .map_err(ApiError::from)?;
    let videos = state
        .store()
        .videos_for_user(&user.email)
        .await
        .map_err(ApiError::from)?;

    let mut entries: Vec<CatalogueEntry> = stories
        .into_iter()
        .map(CatalogueEntry::Story)
        .chain(videos.into_iter().map(CatalogueEntry::Video))
        .collect();

    entries.sort_by_key(|entry| {
        let created_at = match entry {
            CatalogueEntry::Story(s) => s.created_at,
            CatalogueEntry::Video(v) => v.created_at,
        };
        std::cmp::Reverse(created_at)
    });

    Ok(Json(ApiResponse::success(CatalogueResponse { entries })))
}
