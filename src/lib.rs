//! cloudrive - cloud file storage on top of a managed backend
//!
//! Users upload files, organize them into folders, share them by email,
//! and move them through a trash before permanent deletion. Documents,
//! objects and accounts live in a backend-as-a-service; favorites are kept
//! in a local SQLite database.

pub mod backend;
pub mod config;
pub mod db;
pub mod drive;
pub mod error;
pub mod format;
pub mod logging;
pub mod mail;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{DriveError, Result};
