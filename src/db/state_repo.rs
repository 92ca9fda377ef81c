use rusqlite::{params, Connection};

use crate::error::TasktreeError;
use crate::models::{Settings, ViewState};

/// Loads the single persisted view-state row. A missing row or malformed
/// selected-tags blob resets to defaults rather than failing.
pub fn load_view_state(conn: &Connection) -> Result<ViewState, TasktreeError> {
    let row = conn.query_row(
        "SELECT ai_prioritization, hide_completed, selected_tags, search_query
         FROM view_state WHERE id = 1",
        [],
        |row| {
            let tags: String = row.get(2)?;
            Ok(ViewState {
                ai_prioritization: row.get::<_, i64>(0)? != 0,
                hide_completed: row.get::<_, i64>(1)? != 0,
                selected_tags: serde_json::from_str(&tags).unwrap_or_default(),
                search_query: row.get(3)?,
            })
        },
    );
    match row {
        Ok(state) => Ok(state),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(ViewState::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_view_state(conn: &Connection, state: &ViewState) -> Result<(), TasktreeError> {
    conn.execute(
        "INSERT INTO view_state (id, ai_prioritization, hide_completed, selected_tags, search_query)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             ai_prioritization = excluded.ai_prioritization,
             hide_completed = excluded.hide_completed,
             selected_tags = excluded.selected_tags,
             search_query = excluded.search_query",
        params![
            state.ai_prioritization as i64,
            state.hide_completed as i64,
            serde_json::to_string(&state.selected_tags).unwrap_or_else(|_| "[]".into()),
            state.search_query,
        ],
    )?;
    Ok(())
}

pub fn load_settings(conn: &Connection) -> Result<Settings, TasktreeError> {
    let row = conn.query_row(
        "SELECT minimalist_mode FROM settings WHERE id = 1",
        [],
        |row| {
            Ok(Settings {
                minimalist_mode: row.get::<_, i64>(0)? != 0,
            })
        },
    );
    match row {
        Ok(settings) => Ok(settings),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Settings::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_settings(conn: &Connection, settings: &Settings) -> Result<(), TasktreeError> {
    conn.execute(
        "INSERT INTO settings (id, minimalist_mode) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET minimalist_mode = excluded.minimalist_mode",
        params![settings.minimalist_mode as i64],
    )?;
    Ok(())
}
