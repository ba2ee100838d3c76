//! Database schema.

/// Tables and indexes, applied at connect time.
///
/// Every statement is idempotent so the schema can be applied to an
/// existing database file on each start.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "status" (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT 'new',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_status_name ON "status" (name);

CREATE TABLE IF NOT EXISTS "type" (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT 'task',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_type_name ON "type" (name);

CREATE TABLE IF NOT EXISTS "task" (
    id BLOB PRIMARY KEY NOT NULL,
    summary TEXT NOT NULL CHECK (length(summary) <= 255),
    description TEXT,
    status_id BLOB NOT NULL REFERENCES "status" (id) ON DELETE RESTRICT,
    type_id BLOB NOT NULL REFERENCES "type" (id) ON DELETE RESTRICT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_task_summary ON "task" (summary);
CREATE INDEX IF NOT EXISTS ix_task_status_id ON "task" (status_id);
CREATE INDEX IF NOT EXISTS ix_task_type_id ON "task" (type_id);
"#;
