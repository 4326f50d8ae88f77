//! Session exchange and profile handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::{
    ApiResponse, CreateSessionRequest, SessionResponse, UpdateProfileRequest, UserResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/auth/session - Exchange a backend session for an access token.
///
/// The user document is created on first sign-in.
#[utoipa::path(
    post,
    path = "/api/auth/session",
    tag = "auth",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Access token issued", body = SessionResponse),
        (status = 401, description = "Invalid session"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateSessionRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let user = state.users.resolve_session(req.session.trim()).await?;
    let access_token = state.generate_access_token(&user)?;

    tracing::info!(user_id = %user.id, "Session exchanged");

    Ok(Json(ApiResponse::new(SessionResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.access_token_expiry,
        user: user.into(),
    })))
}

/// GET /api/auth/me - Current user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// PUT /api/auth/profile - Update full name and/or avatar.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let updated = state
        .users
        .update_profile(&user, req.full_name.as_deref(), req.avatar.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(updated.into())))
}
