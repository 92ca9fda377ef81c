use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use rusqlite::{params, Connection};

use crate::error::TasktreeError;
use crate::models::{SharePayload, SHARE_TOKEN_LEN, SHARE_TTL_MILLIS};

/// Persist a payload under a fresh random token and return the token.
/// Collision probability over a 10-char alphanumeric space is treated as
/// negligible and not checked. Storage failures propagate.
pub fn create_share(conn: &Connection, payload: &SharePayload) -> Result<String, TasktreeError> {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_TOKEN_LEN)
        .map(char::from)
        .collect();
    let expires_at = Utc::now().timestamp_millis() + SHARE_TTL_MILLIS;
    let payload_json = serde_json::to_string(payload)
        .map_err(|e| TasktreeError::database(e.to_string()))?;
    conn.execute(
        "INSERT INTO shares (id, payload, expires_at) VALUES (?1, ?2, ?3)",
        params![token, payload_json, expires_at],
    )?;
    Ok(token)
}

/// Look up a payload by token. Absent tokens and expired or unreadable
/// records all report `None`; an expired record is deleted on the way out,
/// best-effort (a failed delete still reports absent).
pub fn get_share(conn: &Connection, token: &str) -> Result<Option<SharePayload>, TasktreeError> {
    let row = conn.query_row(
        "SELECT payload, expires_at FROM shares WHERE id = ?1",
        params![token],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    );
    let (payload_json, expires_at) = match row {
        Ok(r) => r,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if expires_at < Utc::now().timestamp_millis() {
        let _ = delete_share(conn, token);
        return Ok(None);
    }

    Ok(serde_json::from_str(&payload_json).ok())
}

/// "Already gone" counts as success; get() and cleanup() may race on the
/// same expired record.
pub fn delete_share(conn: &Connection, token: &str) -> Result<(), TasktreeError> {
    conn.execute("DELETE FROM shares WHERE id = ?1", params![token])?;
    Ok(())
}

/// Sweep every expired record. Individually unreadable rows are skipped
/// without aborting the scan. Returns the number of records removed.
pub fn cleanup_shares(conn: &Connection) -> Result<usize, TasktreeError> {
    let now = Utc::now().timestamp_millis();
    let mut stmt = conn.prepare("SELECT id, expires_at FROM shares")?;
    let expired: Vec<String> = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .filter_map(|row| row.ok())
        .filter(|(_, expires_at)| *expires_at < now)
        .map(|(id, _)| id)
        .collect();

    let mut removed = 0;
    for id in &expired {
        if delete_share(conn, id).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_in_memory;
    use crate::models::Task;

    fn payload_with_task(title: &str) -> SharePayload {
        SharePayload {
            tasks: Some(vec![Task::new(title, None)]),
            tags: Some(vec!["work".into()]),
        }
    }

    fn force_expiry(conn: &Connection, token: &str) {
        conn.execute(
            "UPDATE shares SET expires_at = ?2 WHERE id = ?1",
            params![token, Utc::now().timestamp_millis() - 1000],
        )
        .unwrap();
    }

    #[test]
    fn round_trip_before_expiry() {
        let conn = open_in_memory();
        let payload = payload_with_task("shared task");
        let token = create_share(&conn, &payload).unwrap();
        assert_eq!(token.len(), SHARE_TOKEN_LEN);
        assert_eq!(get_share(&conn, &token).unwrap(), Some(payload));
    }

    #[test]
    fn unknown_token_is_absent_not_error() {
        let conn = open_in_memory();
        assert_eq!(get_share(&conn, "nosuchtokn").unwrap(), None);
    }

    #[test]
    fn expired_record_deleted_on_read() {
        let conn = open_in_memory();
        let token = create_share(&conn, &payload_with_task("old")).unwrap();
        force_expiry(&conn, &token);

        assert_eq!(get_share(&conn, &token).unwrap(), None);
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM shares", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn cleanup_removes_expired_keeps_live() {
        let conn = open_in_memory();
        let dead = create_share(&conn, &payload_with_task("dead")).unwrap();
        let live_payload = payload_with_task("live");
        let live = create_share(&conn, &live_payload).unwrap();
        force_expiry(&conn, &dead);

        assert_eq!(cleanup_shares(&conn).unwrap(), 1);
        assert_eq!(get_share(&conn, &dead).unwrap(), None);
        assert_eq!(get_share(&conn, &live).unwrap(), Some(live_payload));
    }

    #[test]
    fn cleanup_skips_corrupt_payload_rows() {
        let conn = open_in_memory();
        conn.execute(
            "INSERT INTO shares (id, payload, expires_at) VALUES ('corruptrow', 'not json', ?1)",
            params![Utc::now().timestamp_millis() + 1000],
        )
        .unwrap();
        let dead = create_share(&conn, &payload_with_task("dead")).unwrap();
        force_expiry(&conn, &dead);

        // The sweep only inspects expiry; the unreadable live row survives.
        assert_eq!(cleanup_shares(&conn).unwrap(), 1);
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM shares", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[test]
    fn corrupt_payload_reads_as_absent() {
        let conn = open_in_memory();
        conn.execute(
            "INSERT INTO shares (id, payload, expires_at) VALUES ('corruptrow', '{bad', ?1)",
            params![Utc::now().timestamp_millis() + 1000],
        )
        .unwrap();
        assert_eq!(get_share(&conn, "corruptrow").unwrap(), None);
    }
}
