// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Activity log — append-only SQLite feed of issuance and verification events.
//
// Schema:
//   activity_log(
//     id        INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp TEXT    NOT NULL,   -- RFC 3339
//     action    TEXT    NOT NULL,   -- e.g. "issue", "verify", "revoke"
//     token     TEXT    NOT NULL,   -- certificate token text
//     success   INTEGER NOT NULL,   -- 0 = failure, 1 = success
//     details   TEXT                -- optional free-form context
//   )

use std::path::Path;

use certiq_core::error::CertiqError;
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Convert a `rusqlite::Error` into a `CertiqError::Database`.
fn db_err(e: rusqlite::Error) -> CertiqError {
    CertiqError::Database(e.to_string())
}

/// A single entry in the activity feed, used for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub token: String,
    pub success: bool,
    pub details: Option<String>,
}

/// Append-only activity log backed by a SQLite database.
///
/// Every issuance and verification event is recorded with a timestamp, a
/// short action verb, the certificate token involved, and a success/failure
/// flag. Dashboards read this feed newest-first.
pub struct ActivityLog {
    conn: Connection,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS activity_log (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT    NOT NULL,
    action    TEXT    NOT NULL,
    token     TEXT    NOT NULL,
    success   INTEGER NOT NULL,
    details   TEXT
);";

impl ActivityLog {
    /// Open (or create) the activity database at `path`.
    ///
    /// The `activity_log` table is created automatically if it does not
    /// already exist. WAL mode is enabled for better concurrent-read
    /// performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CertiqError> {
        let conn = Connection::open(path).map_err(db_err)?;

        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("activity log opened");
        Ok(Self { conn })
    }

    /// Open an in-memory activity database (useful for tests).
    pub fn open_in_memory() -> Result<Self, CertiqError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("in-memory activity log opened");
        Ok(Self { conn })
    }

    /// Record a new activity entry.
    ///
    /// `action` is a short verb describing the operation (e.g. `"issue"`,
    /// `"verify"`, `"revoke"`). `token` is the certificate token text the
    /// event concerns.
    #[instrument(skip(self, details), fields(%action, %token, success))]
    pub fn record(
        &self,
        action: &str,
        token: &str,
        success: bool,
        details: Option<&str>,
    ) -> Result<(), CertiqError> {
        let timestamp = Utc::now().to_rfc3339();
        let success_int: i32 = if success { 1 } else { 0 };

        self.conn
            .execute(
                "INSERT INTO activity_log (timestamp, action, token, success, details)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![timestamp, action, token, success_int, details],
            )
            .map_err(db_err)?;

        debug!("activity entry recorded");
        Ok(())
    }

    /// Retrieve all entries for a given token, ordered by timestamp
    /// ascending.
    pub fn entries_for_token(&self, token: &str) -> Result<Vec<ActivityEntry>, CertiqError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, action, token, success, details
                 FROM activity_log
                 WHERE token = ?1
                 ORDER BY timestamp ASC",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![token], |row| {
                Ok(ActivityEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    action: row.get(2)?,
                    token: row.get(3)?,
                    success: row.get::<_, i32>(4)? != 0,
                    details: row.get(5)?,
                })
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    /// Retrieve the most recent `limit` entries, ordered newest-first.
    pub fn recent(&self, limit: u32) -> Result<Vec<ActivityEntry>, CertiqError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, action, token, success, details
                 FROM activity_log
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(ActivityEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    action: row.get(2)?,
                    token: row.get(3)?,
                    success: row.get::<_, i32>(4)? != 0,
                    details: row.get(5)?,
                })
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    /// Return the total number of entries in the activity log.
    pub fn count(&self) -> Result<u64, CertiqError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM activity_log", [], |row| row.get(0))
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_log() -> ActivityLog {
        ActivityLog::open_in_memory().expect("open in-memory activity log")
    }

    #[test]
    fn record_and_count() {
        let log = make_log();
        assert_eq!(log.count().unwrap(), 0);

        log.record("issue", "TX-ABC123-DEF456", true, None).unwrap();
        log.record("verify", "TX-ABC123-DEF456", true, Some("scan session"))
            .unwrap();

        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn entries_for_token() {
        let log = make_log();
        log.record("issue", "TX-AAA111-AAAAAA", true, None).unwrap();
        log.record("issue", "TX-BBB222-BBBBBB", true, None).unwrap();
        log.record("verify", "TX-AAA111-AAAAAA", false, Some("not in registry"))
            .unwrap();

        let entries = log.entries_for_token("TX-AAA111-AAAAAA").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "issue");
        assert!(entries[0].success);
        assert_eq!(entries[1].action, "verify");
        assert!(!entries[1].success);
    }

    #[test]
    fn recent_ordering() {
        let log = make_log();
        for i in 0..5 {
            log.record("issue", &format!("TX-{i}00000-AAAAAA"), true, None)
                .unwrap();
        }

        let recent = log.recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        // Newest first — IDs should be descending.
        assert!(recent[0].id > recent[1].id);
        assert!(recent[1].id > recent[2].id);
    }

    #[test]
    fn failure_entry() {
        let log = make_log();
        log.record("verify", "TX-DEAD00-BEEF00", false, Some("malformed token"))
            .unwrap();

        let entries = log.entries_for_token("TX-DEAD00-BEEF00").unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].success);
        assert_eq!(entries[0].details.as_deref(), Some("malformed token"));
    }
}
