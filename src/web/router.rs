//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::dto;
use super::handlers::{self, AppState};
use super::middleware::{
    api_rate_limit, create_cors_layer, jwt_auth, security_headers, session_rate_limit, JwtState,
    RateLimitState,
};
use crate::config::WebConfig;
use crate::drive;

/// Multipart framing allowed on top of the upload size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::create_session,
        handlers::auth::me,
        handlers::auth::update_profile,
        handlers::files::list_files,
        handlers::files::upload_file,
        handlers::files::get_file,
        handlers::files::rename_file,
        handlers::files::share_file,
        handlers::files::delete_file,
        handlers::files::restore_file,
        handlers::files::delete_file_permanently,
        handlers::files::list_trash,
        handlers::files::get_usage,
        handlers::folders::list_folders,
        handlers::folders::create_folder,
        handlers::folders::get_folder,
        handlers::folders::delete_folder,
        handlers::favorites::list_favorites,
        handlers::favorites::add_favorite,
        handlers::favorites::remove_favorite,
    ),
    components(schemas(
        dto::CreateSessionRequest,
        dto::UpdateProfileRequest,
        dto::RenameFileRequest,
        dto::ShareFileRequest,
        dto::CreateFolderRequest,
        dto::SessionResponse,
        dto::UserResponse,
        dto::FileResponse,
        dto::FileListResponse,
        dto::ShareResponse,
        dto::FavoriteResponse,
        dto::FolderResponse,
        dto::FolderDetailResponse,
        dto::DeleteFolderResponse,
        dto::TypeUsageResponse,
        dto::UsageResponse,
        drive::FileType,
        drive::SharePermission,
        drive::SharedUser,
        drive::ShareStats,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Session exchange and profile"),
        (name = "files", description = "Files, trash and usage"),
        (name = "folders", description = "Folders"),
        (name = "favorites", description = "Favorite files"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the main API router.
///
/// Must be called from within a tokio runtime: it spawns the rate limiter
/// cleanup task.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    web_config: &WebConfig,
) -> Router {
    let rate_limits = Arc::new(RateLimitState::new(
        web_config.session_rate_limit,
        web_config.api_rate_limit,
    ));
    rate_limits.clone().start_cleanup_task();

    let upload_limit = usize::try_from(app_state.files.settings().max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let session_limits = rate_limits.clone();
    let session_routes = Router::new()
        .route("/auth/session", post(handlers::auth::create_session))
        .route_layer(middleware::from_fn(move |req, next| {
            session_rate_limit(session_limits.clone(), req, next)
        }));

    let api_limits = rate_limits;
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/profile", put(handlers::auth::update_profile))
        .route(
            "/files",
            get(handlers::files::list_files)
                .post(handlers::files::upload_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/files/:id",
            get(handlers::files::get_file)
                .patch(handlers::files::rename_file)
                .delete(handlers::files::delete_file),
        )
        .route("/files/:id/share", put(handlers::files::share_file))
        .route("/files/:id/restore", post(handlers::files::restore_file))
        .route(
            "/files/:id/permanent",
            axum::routing::delete(handlers::files::delete_file_permanently),
        )
        .route("/trash", get(handlers::files::list_trash))
        .route("/usage", get(handlers::files::get_usage))
        .route(
            "/folders",
            get(handlers::folders::list_folders).post(handlers::folders::create_folder),
        )
        .route(
            "/folders/:id",
            get(handlers::folders::get_folder).delete(handlers::folders::delete_folder),
        )
        .route("/favorites", get(handlers::favorites::list_favorites))
        .route(
            "/favorites/:file_id",
            put(handlers::favorites::add_favorite).delete(handlers::favorites::remove_favorite),
        )
        .route_layer(middleware::from_fn(move |req, next| {
            api_rate_limit(api_limits.clone(), req, next)
        }));

    let api_routes = Router::new().merge(session_routes).merge(protected_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&web_config.cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    jwt_auth(jwt_state.clone(), req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Swagger UI at `/swagger-ui`, serving `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Serve a built front end from `static_path`, falling back to its
/// `index.html` for client-side routes.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let root = Path::new(static_path);
    if !root.is_dir() {
        tracing::warn!(path = %static_path, "Static directory not found, not serving files");
        return None;
    }

    let serve_dir = ServeDir::new(root).fallback(ServeFile::new(root.join("index.html")));
    Some(Router::new().fallback_service(serve_dir))
}
