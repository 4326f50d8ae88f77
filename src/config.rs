//! Configuration module for cloudrive.

use serde::Deserialize;
use std::path::Path;

use crate::{DriveError, Result};

/// General server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Timezone for displaying dates (e.g., "Europe/Istanbul", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

/// Which backend implementation to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The hosted backend-as-a-service over HTTP.
    Remote,
    /// In-process store, for local development.
    Memory,
}

/// Managed backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Backend implementation.
    #[serde(default = "default_backend_mode")]
    pub mode: BackendMode,
    /// API endpoint (e.g. "https://cloud.appwrite.io/v1").
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Project ID.
    #[serde(default)]
    pub project_id: String,
    /// Server API key.
    #[serde(default)]
    pub api_key: String,
    /// Database ID.
    #[serde(default = "default_database_id")]
    pub database_id: String,
    /// Collection holding file documents.
    #[serde(default = "default_files_collection")]
    pub files_collection_id: String,
    /// Collection holding folder documents.
    #[serde(default = "default_folders_collection")]
    pub folders_collection_id: String,
    /// Collection holding user documents.
    #[serde(default = "default_users_collection")]
    pub users_collection_id: String,
    /// Storage bucket ID.
    #[serde(default = "default_bucket_id")]
    pub bucket_id: String,
    /// Request timeout in seconds.
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_mode() -> BackendMode {
    BackendMode::Remote
}

fn default_endpoint() -> String {
    "https://cloud.appwrite.io/v1".to_string()
}

fn default_database_id() -> String {
    "storage".to_string()
}

fn default_files_collection() -> String {
    "files".to_string()
}

fn default_folders_collection() -> String {
    "folders".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_bucket_id() -> String {
    "files".to_string()
}

fn default_backend_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: default_backend_mode(),
            endpoint: default_endpoint(),
            project_id: String::new(),
            api_key: String::new(),
            database_id: default_database_id(),
            files_collection_id: default_files_collection(),
            folders_collection_id: default_folders_collection(),
            users_collection_id: default_users_collection(),
            bucket_id: default_bucket_id(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

/// Local database configuration (favorites).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/cloudrive.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Storage available per user, in bytes.
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: u64,
    /// Avatar assigned to newly created users.
    #[serde(default = "default_avatar")]
    pub default_avatar: String,
}

fn default_max_upload_size() -> u64 {
    50
}

fn default_storage_quota() -> u64 {
    2 * 1024 * 1024 * 1024 // 2GB
}

fn default_avatar() -> String {
    "/assets/images/avatar.png".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: default_max_upload_size(),
            storage_quota_bytes: default_storage_quota(),
            default_avatar: default_avatar(),
        }
    }
}

/// Transactional email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Whether share notifications are actually delivered.
    #[serde(default)]
    pub enabled: bool,
    /// HTTP endpoint of the transactional email API.
    #[serde(default)]
    pub api_url: String,
    /// API key for the email API.
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    #[serde(default)]
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_from_name() -> String {
    "Cloudrive".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: String::new(),
            api_key: String::new(),
            from_address: String::new(),
            from_name: default_from_name(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/cloudrive.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// JWT secret key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_token_expiry_secs: u64,
    /// Whether to serve static files.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Rate limit for the session exchange endpoint (requests per minute).
    #[serde(default = "default_session_rate_limit")]
    pub session_rate_limit: u32,
    /// Rate limit for general API endpoints (requests per minute).
    #[serde(default = "default_api_rate_limit")]
    pub api_rate_limit: u32,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_jwt_access_expiry() -> u64 {
    3600 // 1 hour
}

fn default_static_path() -> String {
    "web/dist".to_string()
}

fn default_session_rate_limit() -> u32 {
    10
}

fn default_api_rate_limit() -> u32 {
    300
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_access_token_expiry_secs: default_jwt_access_expiry(),
            serve_static: false,
            static_path: default_static_path(),
            session_rate_limit: default_session_rate_limit(),
            api_rate_limit: default_api_rate_limit(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// General server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Managed backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Local database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File handling configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DriveError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CLOUDRIVE_JWT_SECRET`
    /// - `CLOUDRIVE_BACKEND_API_KEY`
    /// - `CLOUDRIVE_MAIL_API_KEY`
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_env("CLOUDRIVE_JWT_SECRET") {
            self.web.jwt_secret = secret;
        }
        if let Some(key) = non_empty_env("CLOUDRIVE_BACKEND_API_KEY") {
            self.backend.api_key = key;
        }
        if let Some(key) = non_empty_env("CLOUDRIVE_MAIL_API_KEY") {
            self.mail.api_key = key;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(DriveError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via CLOUDRIVE_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }

        if self.backend.mode == BackendMode::Remote {
            if self.backend.project_id.is_empty() || self.backend.api_key.is_empty() {
                return Err(DriveError::Config(
                    "remote backend requires project_id and api_key".to_string(),
                ));
            }
            url::Url::parse(&self.backend.endpoint)
                .map_err(|e| DriveError::Config(format!("invalid backend endpoint: {e}")))?;
        }

        if self.mail.enabled && (self.mail.api_url.is_empty() || self.mail.from_address.is_empty())
        {
            return Err(DriveError::Config(
                "mail is enabled but api_url or from_address is not set".to_string(),
            ));
        }

        if self.server.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(DriveError::Config(format!(
                "unknown timezone: {}",
                self.server.timezone
            )));
        }

        Ok(())
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.files.max_upload_size_mb * 1024 * 1024
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
