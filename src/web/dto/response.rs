//! Response DTOs for the HTTP API.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use utoipa::ToSchema;

use crate::backend::FileUrls;
use crate::drive::{
    FileList, FileRecord, FileType, FolderDetail, FolderRecord, SharePermission, ShareStats,
    SharedUser, UsageSummary, UserRecord,
};
use crate::format::{convert_file_size, format_date_time, format_utc, MISSING_DATE};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Issued after a successful session exchange.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Access token (JWT).
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

/// A file as seen by the requesting user.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub extension: String,
    pub size: u64,
    /// Human-readable size, e.g. `"1.5 MB"`.
    pub size_label: String,
    /// Public view URL.
    pub url: String,
    pub download_url: String,
    /// Owner user ID.
    pub owner: String,
    /// Emails the file is shared with.
    pub users: Vec<String>,
    pub user_permissions: Vec<SharedUser>,
    pub folder_id: Option<String>,
    pub is_owner: bool,
    pub can_write: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<String>,
    /// Trash time in the server timezone, `"—"` outside the trash.
    pub deleted_label: String,
    /// Whether the viewer marked the file as favorite.
    pub is_favorite: bool,
    /// Whether the share is protected by a password. The hash is never returned.
    pub has_password: bool,
    pub share_expiry_date: Option<String>,
    pub share_permission: Option<SharePermission>,
    pub share_stats: ShareStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Creation time in the server timezone, e.g. `"10:15am, 5 Oct"`.
    pub created_label: String,
}

impl FileResponse {
    pub fn new(file: FileRecord, viewer: &UserRecord, urls: &FileUrls, tz: Tz) -> Self {
        let is_owner = file.is_owner(viewer);
        let can_write = file.can_write(viewer);
        let download_url = urls.download_url(&file.bucket_file_id);

        Self {
            size_label: convert_file_size(file.size, 1),
            created_label: format_utc(&file.created_at, tz),
            deleted_label: format_date_time(file.deleted_at.as_deref(), tz),
            has_password: file.share_password.is_some(),
            id: file.id,
            name: file.name,
            file_type: file.file_type,
            extension: file.extension,
            size: file.size,
            url: file.url,
            download_url,
            owner: file.owner,
            users: file.users,
            user_permissions: file.user_permissions,
            folder_id: file.folder_id,
            is_owner,
            can_write,
            is_deleted: file.is_deleted,
            deleted_at: file.deleted_at,
            is_favorite: false,
            share_expiry_date: file.share_expiry_date,
            share_permission: file.share_permission,
            share_stats: file.share_stats,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    pub fn from_records(
        files: Vec<FileRecord>,
        viewer: &UserRecord,
        urls: &FileUrls,
        tz: Tz,
    ) -> Vec<Self> {
        files
            .into_iter()
            .map(|f| Self::new(f, viewer, urls, tz))
            .collect()
    }
}

fn mark_favorites(files: &mut [FileResponse], favorites: &HashSet<String>) {
    for file in files {
        file.is_favorite = favorites.contains(&file.id);
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    /// Total matches reported by the backend.
    pub total: u64,
    pub files: Vec<FileResponse>,
}

impl FileListResponse {
    pub fn new(list: FileList, viewer: &UserRecord, urls: &FileUrls, tz: Tz) -> Self {
        Self {
            total: list.total,
            files: FileResponse::from_records(list.files, viewer, urls, tz),
        }
    }

    pub fn with_favorites(mut self, favorites: &HashSet<String>) -> Self {
        mark_favorites(&mut self.files, favorites);
        self
    }
}

/// Outcome of a share request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShareResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub file_id: String,
    pub favorite: bool,
    /// False when the request did not change anything.
    pub changed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_label: String,
}

impl FolderResponse {
    pub fn new(folder: FolderRecord, tz: Tz) -> Self {
        Self {
            created_label: format_utc(&folder.created_at, tz),
            id: folder.id,
            name: folder.name,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDetailResponse {
    pub folder: FolderResponse,
    pub files: Vec<FileResponse>,
}

impl FolderDetailResponse {
    pub fn new(detail: FolderDetail, viewer: &UserRecord, urls: &FileUrls, tz: Tz) -> Self {
        Self {
            folder: FolderResponse::new(detail.folder, tz),
            files: FileResponse::from_records(detail.files, viewer, urls, tz),
        }
    }

    pub fn with_favorites(mut self, favorites: &HashSet<String>) -> Self {
        mark_favorites(&mut self.files, favorites);
        self
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteFolderResponse {
    /// Files moved out of the deleted folder.
    pub detached_files: usize,
}

/// Space used by one file type.
#[derive(Debug, Serialize, ToSchema)]
pub struct TypeUsageResponse {
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub size: u64,
    pub size_label: String,
    pub latest_date: Option<DateTime<Utc>>,
    /// `"—"` when there are no files of this type.
    pub latest_label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsageResponse {
    pub types: Vec<TypeUsageResponse>,
    pub used: u64,
    pub used_label: String,
    /// Quota in bytes.
    pub all: u64,
    pub all_label: String,
    pub used_percentage: f64,
}

impl UsageResponse {
    pub fn new(summary: &UsageSummary, tz: Tz) -> Self {
        let types = FileType::ALL
            .iter()
            .map(|&file_type| {
                let usage = summary.get(file_type);
                TypeUsageResponse {
                    file_type,
                    size: usage.size,
                    size_label: convert_file_size(usage.size, 1),
                    latest_date: usage.latest_date,
                    latest_label: usage
                        .latest_date
                        .map(|d| format_utc(&d, tz))
                        .unwrap_or_else(|| MISSING_DATE.to_string()),
                }
            })
            .collect();

        Self {
            types,
            used: summary.used,
            used_label: convert_file_size(summary.used, 1),
            all: summary.all,
            all_label: convert_file_size(summary.all, 1),
            used_percentage: summary.used_percentage,
        }
    }
}
