//! Drive record types, share options and list filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{Document, Query};
use crate::{DriveError, Result};

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "csv", "rtf", "ods", "ppt", "odp", "md", "html",
    "htm", "epub", "pages", "fig", "psd", "ai", "indd", "xd", "sketch", "afdesign", "afphoto",
];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Category of a file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Image,
    Video,
    Audio,
    Other,
}

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Document,
        FileType::Image,
        FileType::Video,
        FileType::Audio,
        FileType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Document => "document",
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Other => "other",
        }
    }

    /// Type and lower-cased extension of `file_name`.
    ///
    /// A name without a dot has an empty extension and is `Other`.
    pub fn classify(file_name: &str) -> (FileType, String) {
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return (FileType::Other, String::new());
        };
        let extension = extension.to_lowercase();

        let file_type = if DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Document
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Image
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Video
        } else if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Audio
        } else {
            FileType::Other
        };

        (file_type, extension)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "document" => Ok(FileType::Document),
            "image" => Ok(FileType::Image),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            "other" => Ok(FileType::Other),
            _ => Err(DriveError::Validation(format!("unknown file type: {s}"))),
        }
    }
}

/// Access granted to the recipients of a share.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    #[default]
    Read,
    Write,
}

impl SharePermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharePermission::Read => "read",
            SharePermission::Write => "write",
        }
    }

    /// Label shown to recipients.
    pub fn label(&self) -> &'static str {
        match self {
            SharePermission::Read => "Read only",
            SharePermission::Write => "Read and write",
        }
    }
}

impl FromStr for SharePermission {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(SharePermission::Read),
            "write" => Ok(SharePermission::Write),
            _ => Err(DriveError::Validation(
                "invalid permission value, must be either \"read\" or \"write\"".to_string(),
            )),
        }
    }
}

/// A recipient of a share and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedUser {
    pub email: String,
    pub permission: SharePermission,
    /// RFC 3339 timestamp.
    pub added_at: String,
}

/// Optional settings applied when sharing a file.
#[derive(Debug, Clone, Default)]
pub struct ShareOptions {
    pub password: Option<String>,
    /// RFC 3339 timestamp.
    pub expiry_date: Option<String>,
    pub permission: Option<SharePermission>,
}

/// Counters kept on a shared file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ShareStats {
    pub views: u64,
    pub downloads: u64,
    pub last_accessed: Option<String>,
}

/// A file document.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub file_type: FileType,
    pub extension: String,
    pub size: u64,
    pub url: String,
    /// ID of the owning user document.
    pub owner: String,
    pub account_id: String,
    /// Emails the file is shared with.
    pub users: Vec<String>,
    pub bucket_file_id: String,
    pub folder_id: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<String>,
    pub user_permissions: Vec<SharedUser>,
    /// Argon2 hash.
    pub share_password: Option<String>,
    pub share_expiry_date: Option<String>,
    pub share_permission: Option<SharePermission>,
    pub share_stats: ShareStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn from_document(doc: &Document) -> Self {
        let file_type = doc
            .str_field("type")
            .and_then(|t| t.parse().ok())
            .unwrap_or(FileType::Other);

        // userPermissions is stored as a JSON string.
        let user_permissions = doc
            .str_field("userPermissions")
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        Self {
            id: doc.id.clone(),
            name: doc.string_or_empty("name"),
            file_type,
            extension: doc.string_or_empty("extension"),
            size: doc.u64_field("size"),
            url: doc.string_or_empty("url"),
            owner: owner_id(doc),
            account_id: doc.string_or_empty("accountId"),
            users: doc.string_list("users"),
            bucket_file_id: doc.string_or_empty("bucketFileId"),
            folder_id: non_empty(doc.str_field("folderId")),
            is_deleted: doc.bool_field("isDeleted"),
            deleted_at: non_empty(doc.str_field("deletedAt")),
            user_permissions,
            share_password: non_empty(doc.str_field("sharePassword")),
            share_expiry_date: non_empty(doc.str_field("shareExpiryDate")),
            share_permission: doc
                .str_field("sharePermission")
                .and_then(|p| p.parse().ok()),
            share_stats: ShareStats {
                views: doc.u64_field("shareStatsViews"),
                downloads: doc.u64_field("shareStatsDownloads"),
                last_accessed: non_empty(doc.str_field("shareStatsLastAccessed")),
            },
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }

    pub fn is_owner(&self, user: &UserRecord) -> bool {
        self.owner == user.id
    }

    /// Owned by or shared with `user`.
    pub fn is_visible_to(&self, user: &UserRecord) -> bool {
        self.is_owner(user)
            || self
                .users
                .iter()
                .any(|email| email.eq_ignore_ascii_case(&user.email))
    }

    /// Owner, or a recipient with write permission.
    pub fn can_write(&self, user: &UserRecord) -> bool {
        self.is_owner(user)
            || self
                .user_permissions
                .iter()
                .any(|u| {
                    u.email.eq_ignore_ascii_case(&user.email)
                        && u.permission == SharePermission::Write
                })
    }
}

/// The owner attribute is either a plain ID or an expanded relationship.
fn owner_id(doc: &Document) -> String {
    match doc.data.get("owner") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Object(owner)) => owner
            .get("$id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// A folder document.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FolderRecord {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.string_or_empty("name"),
            owner_id: doc.string_or_empty("ownerId"),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// A user document, linked to a backend account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub account_id: String,
}

impl UserRecord {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            full_name: doc.string_or_empty("fullName"),
            email: doc.string_or_empty("email"),
            avatar: doc.string_or_empty("avatar"),
            account_id: doc.string_or_empty("accountId"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Attributes files may be sorted by.
const SORTABLE_ATTRIBUTES: &[&str] = &["$createdAt", "$updatedAt", "name", "size"];

/// Sort order parsed from `"<attribute>-<asc|desc>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub attribute: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn to_query(&self) -> Query {
        match self.order {
            SortOrder::Asc => Query::order_asc(self.attribute.clone()),
            SortOrder::Desc => Query::order_desc(self.attribute.clone()),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            attribute: "$createdAt".to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl FromStr for SortSpec {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DriveError::Validation(format!("invalid sort: {s}"));

        let (attribute, order) = s.rsplit_once('-').ok_or_else(invalid)?;
        if !SORTABLE_ATTRIBUTES.contains(&attribute) {
            return Err(invalid());
        }
        let order = match order {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Err(invalid()),
        };

        Ok(Self {
            attribute: attribute.to_string(),
            order,
        })
    }
}

/// Criteria for listing files.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub types: Vec<FileType>,
    pub search: String,
    pub sort: SortSpec,
    pub limit: Option<usize>,
    pub folder_id: Option<String>,
}

/// Queries selecting the files visible to `user` that match `filter`.
pub fn build_file_queries(user: &UserRecord, filter: &FileFilter) -> Vec<Query> {
    let mut queries = vec![Query::or(vec![
        Query::equal("owner", [user.id.as_str()]),
        Query::contains("users", [user.email.as_str()]),
    ])];

    if !filter.types.is_empty() {
        queries.push(Query::equal(
            "type",
            filter.types.iter().map(FileType::as_str),
        ));
    }
    let search = filter.search.trim();
    if !search.is_empty() {
        queries.push(Query::contains("name", [search]));
    }
    if let Some(limit) = filter.limit {
        queries.push(Query::limit(limit));
    }
    queries.push(filter.sort.to_query());
    if let Some(folder_id) = &filter.folder_id {
        queries.push(Query::equal("folderId", [folder_id.as_str()]));
    }

    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn user() -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            full_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: String::new(),
            account_id: "acc1".to_string(),
        }
    }

    fn document(data: Value) -> Document {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Document {
            id: "f1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            FileType::classify("Report.PDF"),
            (FileType::Document, "pdf".to_string())
        );
        assert_eq!(
            FileType::classify("photo.final.jpeg"),
            (FileType::Image, "jpeg".to_string())
        );
        assert_eq!(FileType::classify("clip.mkv").0, FileType::Video);
        assert_eq!(FileType::classify("song.flac").0, FileType::Audio);
        assert_eq!(
            FileType::classify("archive.zip"),
            (FileType::Other, "zip".to_string())
        );
        assert_eq!(
            FileType::classify("Makefile"),
            (FileType::Other, String::new())
        );
    }

    #[test]
    fn test_share_permission_parse() {
        assert_eq!(
            "write".parse::<SharePermission>().unwrap(),
            SharePermission::Write
        );
        assert!("admin".parse::<SharePermission>().is_err());
        assert_eq!(SharePermission::default(), SharePermission::Read);
    }

    #[test]
    fn test_sort_spec_parse() {
        let sort: SortSpec = "name-asc".parse().unwrap();
        assert_eq!(sort.attribute, "name");
        assert_eq!(sort.order, SortOrder::Asc);

        let sort: SortSpec = "$updatedAt-desc".parse().unwrap();
        assert_eq!(sort.to_query(), Query::order_desc("$updatedAt"));

        assert!("owner-asc".parse::<SortSpec>().is_err());
        assert!("name-up".parse::<SortSpec>().is_err());
        assert!("name".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_build_queries_default_filter() {
        let queries = build_file_queries(&user(), &FileFilter::default());
        assert_eq!(
            queries,
            vec![
                Query::or(vec![
                    Query::equal("owner", ["u1"]),
                    Query::contains("users", ["alice@example.com"]),
                ]),
                Query::order_desc("$createdAt"),
            ]
        );
    }

    #[test]
    fn test_build_queries_full_filter() {
        let filter = FileFilter {
            types: vec![FileType::Image, FileType::Video],
            search: " cat ".to_string(),
            sort: "size-asc".parse().unwrap(),
            limit: Some(10),
            folder_id: Some("d1".to_string()),
        };
        let queries = build_file_queries(&user(), &filter);

        assert_eq!(queries.len(), 6);
        assert_eq!(queries[1], Query::equal("type", ["image", "video"]));
        assert_eq!(queries[2], Query::contains("name", ["cat"]));
        assert_eq!(queries[3], Query::limit(10));
        assert_eq!(queries[4], Query::order_asc("size"));
        assert_eq!(queries[5], Query::equal("folderId", ["d1"]));
    }

    #[test]
    fn test_file_record_from_document() {
        let doc = document(json!({
            "name": "cat.png",
            "type": "image",
            "extension": "png",
            "size": 2048,
            "owner": "u1",
            "users": ["bob@example.com"],
            "bucketFileId": "b1",
            "isDeleted": false,
            "userPermissions": r#"[{"email":"bob@example.com","permission":"write","addedAt":"2024-01-01T00:00:00Z"}]"#,
            "sharePermission": "write",
            "shareStatsViews": 3
        }));
        let record = FileRecord::from_document(&doc);

        assert_eq!(record.file_type, FileType::Image);
        assert_eq!(record.size, 2048);
        assert_eq!(record.folder_id, None);
        assert_eq!(record.user_permissions.len(), 1);
        assert_eq!(record.share_permission, Some(SharePermission::Write));
        assert_eq!(record.share_stats.views, 3);

        let bob = UserRecord {
            id: "u2".to_string(),
            email: "bob@example.com".to_string(),
            ..user()
        };
        assert!(record.is_owner(&user()));
        assert!(record.is_visible_to(&bob));
        assert!(record.can_write(&bob));
    }

    #[test]
    fn test_file_record_expanded_owner() {
        let doc = document(json!({"owner": {"$id": "u9", "fullName": "Zed"}}));
        assert_eq!(FileRecord::from_document(&doc).owner, "u9");
    }

    #[test]
    fn test_file_record_bad_permissions_json() {
        let doc = document(json!({"userPermissions": "not json", "type": "weird"}));
        let record = FileRecord::from_document(&doc);
        assert!(record.user_permissions.is_empty());
        assert_eq!(record.file_type, FileType::Other);
    }

    #[test]
    fn test_read_share_cannot_write() {
        let doc = document(json!({
            "owner": "u1",
            "users": ["bob@example.com"],
            "userPermissions": r#"[{"email":"bob@example.com","permission":"read","addedAt":"x"}]"#
        }));
        let record = FileRecord::from_document(&doc);
        let bob = UserRecord {
            id: "u2".to_string(),
            email: "bob@example.com".to_string(),
            ..user()
        };
        let eve = UserRecord {
            id: "u3".to_string(),
            email: "eve@example.com".to_string(),
            ..user()
        };

        assert!(record.is_visible_to(&bob));
        assert!(!record.can_write(&bob));
        assert!(!record.is_visible_to(&eve));
    }
}
