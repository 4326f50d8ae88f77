//! HTTP API for cloudrive.
//!
//! A REST interface over the drive services: a backend session is exchanged
//! for a short-lived JWT which authorizes every other `/api` route.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_router, ApiDoc};
pub use server::WebServer;
