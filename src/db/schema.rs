//! SQL DDL for initializing the handover store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `users` keyed by username; role stored as lowercase TEXT
/// - `sessions` keyed by the opaque token; role/display_name are snapshots
///   taken at login time
/// - `handovers` keyed by document id; payload is serialized JSON
/// - Timestamps are RFC3339 TEXT, so lexicographic ORDER BY is chronological
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    role TEXT NOT NULL,
    display_name TEXT NOT NULL,
    login_time TEXT NOT NULL
);

-- Cascade cleanup on user deletion walks this index.
CREATE INDEX IF NOT EXISTS idx_sessions_username ON sessions(username);

CREATE TABLE IF NOT EXISTS handovers (
    id TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    last_updated TEXT NOT NULL
);
"#;
