//! File handlers: listing, upload, rename, share, trash and usage.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::drive::ShareOptions;
use crate::web::dto::{
    ApiResponse, FileListResponse, FileResponse, ListFilesQuery, RenameFileRequest,
    ShareFileRequest, ShareResponse, UsageResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::DriveError;

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("File is too large")
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// GET /api/files - Files owned by or shared with the user.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Matching files", body = FileListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let filter = query.into_filter()?;
    let user = state.current_user(&claims).await?;
    let list = state.files.list(&user, &filter).await?;
    let favorites = state.files.favorite_ids(&user).await?;

    Ok(Json(ApiResponse::new(
        FileListResponse::new(list, &user, state.urls(), state.timezone())
            .with_favorites(&favorites),
    )))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a `file` field and an optional
/// `folder_id` field.
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Missing file"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found"),
        (status = 413, description = "File too large"),
        (status = 422, description = "Invalid file")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut folder_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("File field has no file name"))?;
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, bytes.to_vec()));
            }
            Some("folder_id") => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                if !value.is_empty() {
                    folder_id = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let (name, content) = file.ok_or_else(|| ApiError::bad_request("Missing file field"))?;
    let user = state.current_user(&claims).await?;

    let max = state.files.settings().max_upload_bytes;
    if content.len() as u64 > max {
        return Err(ApiError::payload_too_large(format!(
            "File exceeds maximum size of {} bytes",
            max
        )));
    }

    let record = state
        .files
        .upload(&user, &name, content, folder_id.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::new(
            record,
            &user,
            state.urls(),
            state.timezone(),
        ))),
    ))
}

/// GET /api/files/:id - File details.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File details", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let record = state.files.get(&user, &id).await?;
    let favorite = state.files.is_favorite(&user, &record.id).await?;

    Ok(Json(ApiResponse::new(
        FileResponse::new(record, &user, state.urls(), state.timezone()).favorite(favorite),
    )))
}

/// PATCH /api/files/:id - Rename a file.
#[utoipa::path(
    patch,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = String, Path, description = "File ID")),
    request_body = RenameFileRequest,
    responses(
        (status = 200, description = "Renamed file", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No write access"),
        (status = 404, description = "File not found"),
        (status = 422, description = "Invalid name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<RenameFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let record = state
        .files
        .rename(&user, &id, &req.name, &req.extension)
        .await?;
    let favorite = state.files.is_favorite(&user, &record.id).await?;

    Ok(Json(ApiResponse::new(
        FileResponse::new(record, &user, state.urls(), state.timezone()).favorite(favorite),
    )))
}

/// PUT /api/files/:id/share - Share a file and notify the recipients.
///
/// Invalid input, unknown files and missing ownership are HTTP errors.
/// Backend failures are logged and reported as `{"success": false}`.
#[utoipa::path(
    put,
    path = "/api/files/{id}/share",
    tag = "files",
    params(("id" = String, Path, description = "File ID")),
    request_body = ShareFileRequest,
    responses(
        (status = 200, description = "Share outcome", body = ShareResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found"),
        (status = 422, description = "Invalid emails or options")
    ),
    security(("bearer_auth" = []))
)]
pub async fn share_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ShareFileRequest>,
) -> Result<Json<ApiResponse<ShareResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let options = ShareOptions {
        password: req.password,
        expiry_date: req.expiry_date,
        permission: req.permission,
    };

    let success = match state.files.share(&user, &id, &req.emails, &options).await {
        Ok(_) => true,
        Err(
            e @ (DriveError::Validation(_)
            | DriveError::NotFound(_)
            | DriveError::Permission(_)
            | DriveError::Auth(_)),
        ) => return Err(e.into()),
        Err(e) => {
            tracing::error!(file_id = %id, error = %e, "Failed to share file");
            false
        }
    };

    Ok(Json(ApiResponse::new(ShareResponse { success })))
}

/// DELETE /api/files/:id - Move a file to the trash.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File moved to trash", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let record = state.files.soft_delete(&user, &id).await?;
    let favorite = state.files.is_favorite(&user, &record.id).await?;

    Ok(Json(ApiResponse::new(
        FileResponse::new(record, &user, state.urls(), state.timezone()).favorite(favorite),
    )))
}

/// POST /api/files/:id/restore - Restore a file from the trash.
#[utoipa::path(
    post,
    path = "/api/files/{id}/restore",
    tag = "files",
    params(("id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File restored", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn restore_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let record = state.files.restore(&user, &id).await?;
    let favorite = state.files.is_favorite(&user, &record.id).await?;

    Ok(Json(ApiResponse::new(
        FileResponse::new(record, &user, state.urls(), state.timezone()).favorite(favorite),
    )))
}

/// DELETE /api/files/:id/permanent - Delete a file and its stored content.
#[utoipa::path(
    delete,
    path = "/api/files/{id}/permanent",
    tag = "files",
    params(("id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file_permanently(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = state.current_user(&claims).await?;
    state.files.hard_delete(&user, &id).await?;

    Ok(Json(ApiResponse::new(())))
}

/// GET /api/trash - Files in the trash.
#[utoipa::path(
    get,
    path = "/api/trash",
    tag = "files",
    responses(
        (status = 200, description = "Trashed files", body = FileListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_trash(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let list = state.files.list_trash(&user).await?;
    let favorites = state.files.favorite_ids(&user).await?;

    Ok(Json(ApiResponse::new(
        FileListResponse::new(list, &user, state.urls(), state.timezone())
            .with_favorites(&favorites),
    )))
}

/// GET /api/usage - Storage used per file type.
#[utoipa::path(
    get,
    path = "/api/usage",
    tag = "files",
    responses(
        (status = 200, description = "Storage usage", body = UsageResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UsageResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let summary = state.files.usage(&user).await?;

    Ok(Json(ApiResponse::new(UsageResponse::new(
        &summary,
        state.timezone(),
    ))))
}
