// Schema bootstrap statements, applied in order inside one transaction.

/// Serializes bootstrap across processes sharing a database.
pub const BOOTSTRAP_LOCK_KEY: i64 = 0x7072_6f6a_6d67_7200;

pub const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        owner_identity TEXT NOT NULL REFERENCES users(email) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_projects_owner
        ON projects (owner_identity, created_at)",
    "CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        sender TEXT NOT NULL CHECK (sender IN ('user', 'assistant')),
        project_id TEXT REFERENCES projects(id) ON DELETE CASCADE,
        \"timestamp\" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        -- Insertion order, breaks timestamp ties
        seq BIGINT GENERATED ALWAYS AS IDENTITY
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_project
        ON messages (project_id, \"timestamp\", seq)",
    "CREATE TABLE IF NOT EXISTS files (
        id TEXT PRIMARY KEY,
        filename TEXT NOT NULL,
        size BIGINT NOT NULL CHECK (size >= 0),
        owner_identity TEXT NOT NULL REFERENCES users(email) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_files_owner
        ON files (owner_identity, created_at)",
];
