//! Folder handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, DeleteFolderResponse, FolderDetailResponse, FolderResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// GET /api/folders - Folders owned by the user, newest first.
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Owned folders", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let tz = state.timezone();
    let folders = state
        .folders
        .list(&user)
        .await?
        .into_iter()
        .map(|f| FolderResponse::new(f, tz))
        .collect();

    Ok(Json(ApiResponse::new(folders)))
}

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let user = state.current_user(&claims).await?;
    let folder = state.folders.create(&user, &req.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::new(
            folder,
            state.timezone(),
        ))),
    ))
}

/// GET /api/folders/:id - Folder with its files.
#[utoipa::path(
    get,
    path = "/api/folders/{id}",
    tag = "folders",
    params(("id" = String, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder details", body = FolderDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FolderDetailResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let detail = state.folders.get(&user, &id).await?;
    let favorites = state.files.favorite_ids(&user).await?;

    Ok(Json(ApiResponse::new(
        FolderDetailResponse::new(detail, &user, state.urls(), state.timezone())
            .with_favorites(&favorites),
    )))
}

/// DELETE /api/folders/:id - Delete a folder; its files are kept.
#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    tag = "folders",
    params(("id" = String, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder deleted", body = DeleteFolderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteFolderResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let detached_files = state.folders.delete(&user, &id).await?;

    Ok(Json(ApiResponse::new(DeleteFolderResponse {
        detached_files,
    })))
}
