//! Favorite handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::{ApiResponse, FavoriteResponse, FileResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// GET /api/favorites - Favorite files, in the order they were added.
#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    responses(
        (status = 200, description = "Favorite files", body = Vec<FileResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let files = state.files.favorites(&user).await?;

    let files: Vec<FileResponse> =
        FileResponse::from_records(files, &user, state.urls(), state.timezone())
            .into_iter()
            .map(|f| f.favorite(true))
            .collect();

    Ok(Json(ApiResponse::new(files)))
}

/// PUT /api/favorites/:file_id - Mark a file as favorite.
#[utoipa::path(
    put,
    path = "/api/favorites/{file_id}",
    tag = "favorites",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File is a favorite", body = FavoriteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FavoriteResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let changed = state.files.add_favorite(&user, &file_id).await?;

    Ok(Json(ApiResponse::new(FavoriteResponse {
        file_id,
        favorite: true,
        changed,
    })))
}

/// DELETE /api/favorites/:file_id - Unmark a favorite.
#[utoipa::path(
    delete,
    path = "/api/favorites/{file_id}",
    tag = "favorites",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File is not a favorite", body = FavoriteResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FavoriteResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let changed = state.files.remove_favorite(&user, &file_id).await?;

    Ok(Json(ApiResponse::new(FavoriteResponse {
        file_id,
        favorite: false,
        changed,
    })))
}
