use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, LoginRequest, SignupRequest, UpdateProfileRequest};
use crate::models::SessionUser;
use crate::services::ProfileUpdate;

const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Middleware
// ============================================================================

/// Requires a logged-in session; everything behind the protected router
/// goes through here.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(user)) = session.get::<SessionUser>(SESSION_USER_KEY).await {
        tracing::Span::current().record("user_id", user.email.as_str());
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
/// Create an account and open a session for it.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .auth()
        .signup(
            &payload.name,
            &payload.email,
            &payload.password,
            payload.bio,
        )
        .await?;

    put_session_user(&session, &user).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Authenticate with email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let user = state.auth().login(&payload.email, &payload.password).await?;

    put_session_user(&session, &user).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
/// Invalidate the current session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "failed to flush session on logout");
    }
    state.auth().logout().await?;
    Ok((StatusCode::OK, "Logged out"))
}

/// GET /auth/me
/// Current user, re-read from the store so the session always reflects
/// the latest persisted fields.
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    let user = get_session_user(&session).await?;

    let account = state
        .store()
        .get_account(&user.email)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load account: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(ApiResponse::success(account.to_session_user())))
}

/// PUT /auth/profile
/// Update name/email/bio. An email change relocates the stored record.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<SessionUser>>, ApiError> {
    if payload.name.is_empty() || payload.email.is_empty() {
        return Err(ApiError::validation("Name and email are required"));
    }

    let current = get_session_user(&session).await?;

    let updated = state
        .auth()
        .update_profile(
            &current.email,
            ProfileUpdate {
                name: payload.name,
                email: payload.email,
                bio: payload.bio,
            },
        )
        .await?;

    put_session_user(&session, &updated).await?;
    tracing::info!(email = %updated.email, "profile updated");

    Ok(Json(ApiResponse::success(updated)))
}

// ============================================================================
// Helpers
// ============================================================================

pub(super) async fn get_session_user(session: &Session) -> Result<SessionUser, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

async fn put_session_user(session: &Session, user: &SessionUser) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}
