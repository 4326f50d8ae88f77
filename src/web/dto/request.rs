//! Request DTOs for the HTTP API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, no_path_separators, not_empty_trimmed};
use crate::drive::{FileFilter, FileType, SharePermission};
use crate::web::error::ApiError;

/// Exchange a backend session secret for an API token.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 1024, message = "Session is required"))]
    pub session: String,
}

/// Profile update. Absent fields are left unchanged; an empty avatar resets it.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(
        length(max = 100, message = "Full name is too long"),
        custom(function = "no_control_chars")
    )]
    pub full_name: Option<String>,
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar: Option<String>,
}

/// Rename a file to `name.extension`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameFileRequest {
    #[validate(
        length(max = 255, message = "Name is too long"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars"),
        custom(function = "no_path_separators")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(
        length(max = 32, message = "Extension is too long"),
        custom(function = "no_control_chars"),
        custom(function = "no_path_separators")
    )]
    pub extension: String,
}

/// Share a file with a list of recipients.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ShareFileRequest {
    /// Replaces the current recipients; an empty list unshares the file.
    #[validate(length(max = 100, message = "Too many recipients"))]
    pub emails: Vec<String>,
    pub password: Option<String>,
    /// RFC 3339 timestamp.
    pub expiry_date: Option<String>,
    pub permission: Option<SharePermission>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderRequest {
    #[validate(
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
}

/// Query string for `GET /api/files`.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Comma-separated file types, e.g. `document,image`.
    pub types: Option<String>,
    /// Substring of the file name.
    pub search: Option<String>,
    /// `<attribute>-<asc|desc>`, e.g. `$createdAt-desc`.
    pub sort: Option<String>,
    #[validate(range(min = 1, max = 5000, message = "Limit must be between 1 and 5000"))]
    pub limit: Option<usize>,
    pub folder_id: Option<String>,
}

impl ListFilesQuery {
    /// Validate and convert into a [`FileFilter`].
    pub fn into_filter(self) -> Result<FileFilter, ApiError> {
        self.validate().map_err(ApiError::from_validation_errors)?;

        let types = self
            .types
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::parse::<FileType>)
            .collect::<Result<Vec<_>, _>>()?;

        let sort = match self.sort.as_deref().map(str::trim) {
            Some(sort) if !sort.is_empty() => sort.parse()?,
            _ => Default::default(),
        };

        Ok(FileFilter {
            types,
            search: self.search.unwrap_or_default(),
            sort,
            limit: self.limit,
            folder_id: self.folder_id.filter(|id| !id.trim().is_empty()),
        })
    }
}
