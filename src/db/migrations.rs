use rusqlite::Connection;

use crate::error::TasktreeError;

pub fn run_migrations(conn: &Connection) -> Result<(), TasktreeError> {
    conn.execute_batch(
        "
        -- `id` is deliberately not a primary key: import appends documents
        -- verbatim, and importing the same export twice duplicates ids.
        -- Uniqueness is enforced at the command layer for normal adds.
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            created_at TEXT NOT NULL,
            -- No foreign key on purpose: import appends verbatim and may
            -- carry parents that are not part of this collection.
            parent_id TEXT,
            priority TEXT CHECK (priority IS NULL OR priority IN ('low', 'medium', 'high')),
            files TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            share_id TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS view_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            ai_prioritization INTEGER NOT NULL DEFAULT 0,
            hide_completed INTEGER NOT NULL DEFAULT 0,
            selected_tags TEXT NOT NULL DEFAULT '[]',
            search_query TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            minimalist_mode INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS shares (
            id TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            expires_at INTEGER NOT NULL
        );

        INSERT OR IGNORE INTO view_state (id) VALUES (1);
        INSERT OR IGNORE INTO settings (id) VALUES (1);

        CREATE INDEX IF NOT EXISTS idx_tasks_id ON tasks(id);
        CREATE INDEX IF NOT EXISTS idx_tasks_parent ON tasks(parent_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_order ON tasks(sort_order);
        CREATE INDEX IF NOT EXISTS idx_shares_expires ON shares(expires_at);
        ",
    )?;
    Ok(())
}
