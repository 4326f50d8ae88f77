//! API handlers.

pub mod auth;
pub mod favorites;
pub mod files;
pub mod folders;

use std::sync::Arc;

use chrono_tz::Tz;
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::backend::{Backend, FileUrls};
use crate::db::Database;
use crate::drive::{DriveSettings, FileService, FolderService, UserRecord, UserService};
use crate::mail::Mailer;
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::DriveError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub files: FileService,
    pub folders: FolderService,
    pub users: UserService,
    /// JWT encoding key.
    encoding_key: EncodingKey,
    /// Access token lifetime in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    pub fn new(
        backend: Backend,
        db: Database,
        mailer: Arc<dyn Mailer>,
        settings: DriveSettings,
        jwt_secret: &str,
        access_token_expiry: u64,
    ) -> Self {
        let users = UserService::new(backend.clone(), settings.default_avatar.clone());
        Self {
            folders: FolderService::new(backend.clone()),
            files: FileService::new(backend, db, mailer, settings),
            users,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Issue an access token for `user`.
    pub fn generate_access_token(&self, user: &UserRecord) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id.clone(),
            account_id: user.account_id.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Load the user a token was issued to.
    pub async fn current_user(&self, claims: &JwtClaims) -> Result<UserRecord, ApiError> {
        match self.users.get(&claims.sub).await {
            Ok(user) => Ok(user),
            Err(DriveError::NotFound(_)) => Err(ApiError::unauthorized("User no longer exists")),
            Err(e) => Err(e.into()),
        }
    }

    pub fn urls(&self) -> &FileUrls {
        &self.files.backend().urls
    }

    pub fn timezone(&self) -> Tz {
        self.files.settings().timezone
    }
}
