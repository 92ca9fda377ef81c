use std::env;
use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::error::TasktreeError;

use super::migrations;

const DATA_DIR_ENV: &str = "TASKTREE_DATA_DIR";

/// Resolve the data directory: `TASKTREE_DATA_DIR` override first, else the
/// platform config dir.
pub fn data_dir() -> Result<PathBuf, TasktreeError> {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|d| d.join("tasktree"))
        .ok_or_else(|| TasktreeError::database("Could not determine a config directory"))
}

pub fn db_path() -> Result<PathBuf, TasktreeError> {
    Ok(data_dir()?.join("tasktree.db"))
}

/// Open a connection to the database. Returns error if not initialized.
pub fn open_db() -> Result<Connection, TasktreeError> {
    let path = db_path()?;
    if !path.exists() {
        return Err(TasktreeError::not_initialized());
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Initialize the database: create directories, database, and run migrations.
pub fn init_db() -> Result<PathBuf, TasktreeError> {
    let path = db_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TasktreeError::database(e.to_string()))?;
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(path)
}

fn configure_connection(conn: &Connection) -> Result<(), TasktreeError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// In-memory database with the full schema, for unit tests.
#[cfg(test)]
pub fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    migrations::run_migrations(&conn).expect("migrations");
    conn
}
