//! SQLite schema.
//!
//! Applied idempotently on every open. Cascade rules live here, not in
//! engine code: deleting a project removes its environments, secrets,
//! history, audit entries, and sync state in one statement.

pub(super) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT,
    team_id      TEXT,
    owner_id     TEXT NOT NULL,
    sync_enabled INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id);
CREATE INDEX IF NOT EXISTS idx_projects_team ON projects(team_id);

CREATE TABLE IF NOT EXISTS environments (
    id         TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
    UNIQUE(project_id, name)
);

CREATE INDEX IF NOT EXISTS idx_environments_project ON environments(project_id);

CREATE TABLE IF NOT EXISTS secrets (
    id              TEXT PRIMARY KEY,
    environment_id  TEXT NOT NULL,
    key             TEXT NOT NULL,
    encrypted_value BLOB NOT NULL,
    description     TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    FOREIGN KEY (environment_id) REFERENCES environments(id) ON DELETE CASCADE,
    UNIQUE(environment_id, key)
);

CREATE INDEX IF NOT EXISTS idx_secrets_environment ON secrets(environment_id);
CREATE INDEX IF NOT EXISTS idx_secrets_key ON secrets(key);

CREATE TABLE IF NOT EXISTS secret_history (
    id              TEXT PRIMARY KEY,
    secret_id       TEXT NOT NULL,
    environment_id  TEXT NOT NULL,
    key             TEXT NOT NULL,
    encrypted_value BLOB NOT NULL,
    description     TEXT,
    version         INTEGER NOT NULL,
    created_at      TEXT NOT NULL,
    FOREIGN KEY (secret_id) REFERENCES secrets(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_secret_history_secret ON secret_history(secret_id);

CREATE TABLE IF NOT EXISTS audit_logs (
    id         TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    action     TEXT NOT NULL,
    metadata   TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_audit_logs_project ON audit_logs(project_id);
CREATE INDEX IF NOT EXISTS idx_audit_logs_created ON audit_logs(created_at DESC);

CREATE TABLE IF NOT EXISTS sync_metadata (
    id           TEXT PRIMARY KEY,
    project_id   TEXT NOT NULL UNIQUE,
    last_sync_at TEXT,
    version      INTEGER NOT NULL DEFAULT 1,
    checksum     TEXT,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);
"#;
