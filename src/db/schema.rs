//! Database schema and migrations for cloudrive.
//!
//! Migrations are applied sequentially; the schema_version table tracks
//! which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: favorites
    r#"
-- Per-user favorite files. file_id references a document in the managed backend.
CREATE TABLE favorites (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     TEXT NOT NULL,
    file_id     TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(user_id, file_id)
);

CREATE INDEX idx_favorites_user ON favorites(user_id);
CREATE INDEX idx_favorites_file ON favorites(file_id);
"#,
];
