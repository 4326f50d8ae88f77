//! File, folder and user operations on top of the managed backend.
//!
//! Every operation takes the acting [`UserRecord`] and enforces visibility:
//! a file is visible to its owner and to the users it is shared with.
//! Modifying operations other than rename are limited to the owner.

mod favorites;
mod files;
mod folders;
mod password;
mod types;
mod usage;
mod users;

pub use files::{FileList, FileService};
pub use folders::{FolderDetail, FolderService, MAX_FOLDER_NAME_LENGTH};
pub use password::{
    hash_share_password, validate_share_password, MAX_SHARE_PASSWORD_LENGTH,
    MIN_SHARE_PASSWORD_LENGTH,
};
pub use types::{
    build_file_queries, FileFilter, FileRecord, FileType, FolderRecord, ShareOptions,
    SharePermission, ShareStats, SharedUser, SortOrder, SortSpec, UserRecord,
};
pub use usage::{TypeUsage, UsageSummary};
pub use users::{UserService, MAX_FULL_NAME_LENGTH};

use chrono_tz::Tz;

use crate::config::Config;
use crate::format::parse_timezone;

/// Limits and presentation settings shared by the services.
#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub max_upload_bytes: u64,
    pub storage_quota_bytes: u64,
    pub default_avatar: String,
    pub timezone: Tz,
}

impl DriveSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes(),
            storage_quota_bytes: config.files.storage_quota_bytes,
            default_avatar: config.files.default_avatar.clone(),
            timezone: parse_timezone(&config.server.timezone),
        }
    }
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
