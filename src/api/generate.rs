use axum::{Json, extract::State};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, GenerateRequest, GenerateResponse,
    RegenerateImagesResponse, TranslateRequest, TranslateResponse,
};
use crate::api::auth::get_session_user;
use tower_sessions::Session;

/// POST /generate
/// Story first, then (when requested) three professional photo variants.
/// The result is returned even when the save afterwards fails; the save
/// failure rides along in the response.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<GenerateResponse>>, ApiError> {
    if payload.description.is_empty() {
        return Err(ApiError::validation("Product description is required"));
    }
    if payload.image.base64.is_empty() {
        return Err(ApiError::validation("A product image is required"));
    }

    let user = get_session_user(&session).await?;
    let inputs = payload.into_inputs();

    let result = state.generation().generate(&inputs, Some(&user)).await?;

    let save_error = state
        .store()
        .push_story(&user.email, result.clone())
        .await
        .err();
    if let Some(e) = &save_error {
        tracing::warn!(email = %user.email, error = %e, "failed to save story result");
    }

    Ok(Json(ApiResponse::success(GenerateResponse {
        result,
        saved: save_error.is_none(),
        save_error: save_error.map(|e| ApiError::from(e).to_string()),
    })))
}

/// POST /generate/images
/// Regenerate just the image batch for an existing set of inputs. A
/// failure here never touches a previously stored story.
pub async fn regenerate_images(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<RegenerateImagesResponse>>, ApiError> {
    get_session_user(&session).await?;
    let inputs = payload.into_inputs();

    let images = state
        .generation()
        .generate_professional_images(&inputs)
        .await?;

    Ok(Json(ApiResponse::success(RegenerateImagesResponse {
        images,
    })))
}

/// POST /translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<ApiResponse<TranslateResponse>>, ApiError> {
    if payload.text.is_empty() {
        return Err(ApiError::validation("Text to translate is required"));
    }
    if payload.target_language.is_empty() {
        return Err(ApiError::validation("Target language is required"));
    }

    let translated = state
        .generation()
        .translate(&payload.text, &payload.target_language)
        .await?;

    Ok(Json(ApiResponse::success(TranslateResponse { translated })))
}
