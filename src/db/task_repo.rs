use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::TasktreeError;
use crate::models::{Priority, Task};

const TASK_COLUMNS: &str = "id, title, description, completed, due_date, created_at,
                parent_id, priority, files, tags, share_id, sort_order";

pub fn insert_task(conn: &Connection, task: &Task) -> Result<(), TasktreeError> {
    conn.execute(
        "INSERT INTO tasks (id, title, description, completed, due_date, created_at,
                            parent_id, priority, files, tags, share_id, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            task.id,
            task.title,
            task.description,
            task.completed as i64,
            task.due_date.map(|d| d.to_rfc3339()),
            task.created_at.to_rfc3339(),
            task.parent_id,
            task.priority.map(|p| p.as_str()),
            serde_json::to_string(&task.files).unwrap_or_else(|_| "[]".into()),
            serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".into()),
            task.share_id,
            task.sort_order,
        ],
    )?;
    Ok(())
}

/// Full-record replace. Signals not-found instead of silently doing nothing.
pub fn replace_task(conn: &Connection, task: &Task) -> Result<(), TasktreeError> {
    let changed = conn.execute(
        "UPDATE tasks SET title = ?2, description = ?3, completed = ?4, due_date = ?5,
                created_at = ?6, parent_id = ?7, priority = ?8, files = ?9, tags = ?10,
                share_id = ?11, sort_order = ?12
         WHERE id = ?1",
        params![
            task.id,
            task.title,
            task.description,
            task.completed as i64,
            task.due_date.map(|d| d.to_rfc3339()),
            task.created_at.to_rfc3339(),
            task.parent_id,
            task.priority.map(|p| p.as_str()),
            serde_json::to_string(&task.files).unwrap_or_else(|_| "[]".into()),
            serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".into()),
            task.share_id,
            task.sort_order,
        ],
    )?;
    if changed == 0 {
        return Err(TasktreeError::task_not_found(&task.id));
    }
    Ok(())
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, TasktreeError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => TasktreeError::task_not_found(id),
        _ => TasktreeError::from(e),
    })
}

pub fn task_exists(conn: &Connection, id: &str) -> Result<bool, TasktreeError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// The whole collection in persisted order.
pub fn list_tasks(conn: &Connection) -> Result<Vec<Task>, TasktreeError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks ORDER BY sort_order ASC, created_at ASC, rowid ASC"
    ))?;
    let tasks = stmt
        .query_map([], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

/// Direct children only (single level).
pub fn children_of(conn: &Connection, parent_id: &str) -> Result<Vec<Task>, TasktreeError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE parent_id = ?1
         ORDER BY sort_order ASC, created_at ASC, rowid ASC"
    ))?;
    let tasks = stmt
        .query_map(params![parent_id], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn delete_tasks(conn: &Connection, ids: &[String]) -> Result<usize, TasktreeError> {
    let mut deleted = 0;
    for id in ids {
        deleted += conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    }
    Ok(deleted)
}

pub fn delete_all_tasks(conn: &Connection) -> Result<usize, TasktreeError> {
    Ok(conn.execute("DELETE FROM tasks", [])?)
}

pub fn set_completed(conn: &Connection, id: &str, completed: bool) -> Result<(), TasktreeError> {
    let changed = conn.execute(
        "UPDATE tasks SET completed = ?2 WHERE id = ?1",
        params![id, completed as i64],
    )?;
    if changed == 0 {
        return Err(TasktreeError::task_not_found(id));
    }
    Ok(())
}

pub fn set_share_id(conn: &Connection, id: &str, share_id: &str) -> Result<(), TasktreeError> {
    conn.execute(
        "UPDATE tasks SET share_id = ?2 WHERE id = ?1",
        params![id, share_id],
    )?;
    Ok(())
}

pub fn set_order_and_priority(
    conn: &Connection,
    id: &str,
    sort_order: i64,
    priority: Option<Priority>,
) -> Result<(), TasktreeError> {
    conn.execute(
        "UPDATE tasks SET sort_order = ?2, priority = ?3 WHERE id = ?1",
        params![id, sort_order, priority.map(|p| p.as_str())],
    )?;
    Ok(())
}

pub fn clear_priorities(conn: &Connection) -> Result<(), TasktreeError> {
    conn.execute("UPDATE tasks SET priority = NULL", [])?;
    Ok(())
}

pub fn max_sort_order(conn: &Connection) -> Result<i64, TasktreeError> {
    let max: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) FROM tasks",
        [],
        |row| row.get(0),
    )?;
    Ok(max)
}

/// Malformed persisted fields degrade to defaults instead of failing the
/// whole load.
fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let due_date: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let priority: Option<String> = row.get(7)?;
    let files: String = row.get(8)?;
    let tags: String = row.get(9)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get::<_, i64>(3)? != 0,
        due_date: due_date.and_then(|d| parse_rfc3339(&d)),
        created_at: parse_rfc3339(&created_at).unwrap_or_else(Utc::now),
        parent_id: row.get(6)?,
        priority: priority.as_deref().and_then(Priority::from_str),
        files: serde_json::from_str(&files).unwrap_or_default(),
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        share_id: row.get(10)?,
        sort_order: row.get(11)?,
    })
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
