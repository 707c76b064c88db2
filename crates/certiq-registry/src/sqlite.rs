// SPDX-License-Identifier: MIT OR Apache-2.0
//
// SQLite-backed record store.
//
// Schema:
//   certificates(
//     id                TEXT PRIMARY KEY,   -- token text, immutable
//     recipient_name    TEXT NOT NULL,
//     recipient_email   TEXT NOT NULL,
//     program           TEXT NOT NULL,
//     certificate_title TEXT NOT NULL,
//     template          TEXT NOT NULL,      -- template display name
//     issued_date       TEXT NOT NULL,      -- ISO 8601 date
//     status            TEXT NOT NULL,      -- "issued" | "pending" | "revoked"
//     created_at        TEXT NOT NULL,      -- RFC 3339
//     updated_at        TEXT NOT NULL       -- RFC 3339
//   )
//   drafts(slot TEXT PRIMARY KEY, payload TEXT NOT NULL)

use std::path::Path;

use certiq_core::error::{CertiqError, Result};
use certiq_core::token::Token;
use certiq_core::types::{
    CertificateDraft, CertificateRecord, CertificateStatus, CertificateTemplate, ListFilter,
    StatusSummary,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument};

use crate::store::{DraftStore, RecordStore};

/// Convert a `rusqlite::Error` into a `CertiqError::Database`.
fn db_err(e: rusqlite::Error) -> CertiqError {
    CertiqError::Database(e.to_string())
}

/// A row that fails to parse back into domain types.
fn corrupt(column: &str, value: &str) -> CertiqError {
    CertiqError::Database(format!("corrupt {column} in certificates row: {value:?}"))
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS certificates (
    id                TEXT PRIMARY KEY,
    recipient_name    TEXT NOT NULL,
    recipient_email   TEXT NOT NULL,
    program           TEXT NOT NULL,
    certificate_title TEXT NOT NULL,
    template          TEXT NOT NULL,
    issued_date       TEXT NOT NULL,
    status            TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS drafts (
    slot    TEXT PRIMARY KEY,
    payload TEXT NOT NULL
);";

const SELECT_COLUMNS: &str = "id, recipient_name, recipient_email, program, certificate_title,
    template, issued_date, status, created_at, updated_at";

/// Raw column values before conversion into a `CertificateRecord`.
type RawRow = (
    String, String, String, String, String,
    String, String, String, String, String,
);

/// Certificate registry backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the registry database at `path`.
    ///
    /// Tables are created automatically if they do not already exist. WAL
    /// mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;

        // Enable WAL for concurrent readers.
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("certificate registry opened");
        Ok(Self { conn })
    }

    /// Open an in-memory registry (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("in-memory certificate registry opened");
        Ok(Self { conn })
    }

    fn record_from_raw(raw: RawRow) -> Result<CertificateRecord> {
        let (id, recipient_name, recipient_email, program, certificate_title,
            template, issued_date, status, created_at, updated_at) = raw;

        Ok(CertificateRecord {
            id: Token::parse(&id).map_err(|_| corrupt("id", &id))?,
            recipient_name,
            recipient_email,
            program,
            certificate_title,
            template: CertificateTemplate::from_display_name(&template)
                .ok_or_else(|| corrupt("template", &template))?,
            issued_date: issued_date
                .parse::<NaiveDate>()
                .map_err(|_| corrupt("issued_date", &issued_date))?,
            status: CertificateStatus::from_keyword(&status)
                .ok_or_else(|| corrupt("status", &status))?,
            created_at: parse_rfc3339(&created_at)?,
            updated_at: parse_rfc3339(&updated_at)?,
        })
    }
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt("timestamp", raw))
}

impl RecordStore for SqliteStore {
    #[instrument(skip_all, fields(id = %record.id))]
    fn create(&self, record: &CertificateRecord) -> Result<()> {
        if let Some(existing) = self.get(&record.id)? {
            if &existing == record {
                // Idempotent replay of the same write.
                return Ok(());
            }
            return Err(CertiqError::DuplicateId(record.id.as_str().to_owned()));
        }

        self.conn
            .execute(
                "INSERT INTO certificates (id, recipient_name, recipient_email, program,
                     certificate_title, template, issued_date, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id.as_str(),
                    record.recipient_name,
                    record.recipient_email,
                    record.program,
                    record.certificate_title,
                    record.template.display_name(),
                    record.issued_date.to_string(),
                    record.status.as_str(),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .map_err(db_err)?;

        debug!("record created");
        Ok(())
    }

    fn get(&self, id: &Token) -> Result<Option<CertificateRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM certificates WHERE id = ?1"),
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?,
                        row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?;

        raw.map(Self::record_from_raw).transpose()
    }

    fn update_status(&self, id: &Token, status: CertificateStatus) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE certificates SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), Utc::now().to_rfc3339(), id.as_str()],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    fn delete(&self, id: &Token) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM certificates WHERE id = ?1", params![id.as_str()])
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<CertificateRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM certificates ORDER BY rowid DESC"
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?,
                    row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?,
                ))
            })
            .map_err(db_err)?;

        let mut records = Vec::new();
        for raw in rows {
            let record = Self::record_from_raw(raw.map_err(db_err)?)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn status_summary(&self) -> Result<StatusSummary> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM certificates GROUP BY status")
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))
            .map_err(db_err)?;

        let mut summary = StatusSummary::default();
        for row in rows {
            let (status, count) = row.map_err(db_err)?;
            match CertificateStatus::from_keyword(&status) {
                Some(CertificateStatus::Issued) => summary.issued = count,
                Some(CertificateStatus::Pending) => summary.pending = count,
                Some(CertificateStatus::Revoked) => summary.revoked = count,
                None => return Err(corrupt("status", &status)),
            }
        }
        Ok(summary)
    }

    fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM certificates", [])
            .map_err(db_err)?;
        Ok(())
    }
}

impl DraftStore for SqliteStore {
    fn save_draft(&self, draft: &CertificateDraft) -> Result<()> {
        let payload = serde_json::to_string(draft)?;
        self.conn
            .execute(
                "INSERT INTO drafts (slot, payload) VALUES ('current', ?1)
                 ON CONFLICT(slot) DO UPDATE SET payload = excluded.payload",
                params![payload],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn load_draft(&self) -> Result<Option<CertificateDraft>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM drafts WHERE slot = 'current'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(suffix: u8, name: &str) -> CertificateRecord {
        let now = Utc::now();
        CertificateRecord {
            id: Token::mint(1_700_000_000_000 + suffix as u64, &[suffix; 6]),
            recipient_name: name.to_owned(),
            recipient_email: "jane@example.com".to_owned(),
            program: "BS Computer Science".to_owned(),
            certificate_title: "Certificate of Completion".to_owned(),
            template: CertificateTemplate::AcademicDegree,
            issued_date: now.date_naive(),
            status: CertificateStatus::Issued,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_get_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record(1, "Jane Doe");
        store.create(&rec).unwrap();

        let loaded = store.get(&rec.id).unwrap().expect("record must exist");
        assert_eq!(loaded.id, rec.id);
        assert_eq!(loaded.recipient_name, rec.recipient_name);
        assert_eq!(loaded.template, rec.template);
        assert_eq!(loaded.status, rec.status);
        assert_eq!(loaded.issued_date, rec.issued_date);
    }

    #[test]
    fn create_is_idempotent_and_rejects_conflicts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record(1, "Jane Doe");
        store.create(&rec).unwrap();
        store.create(&rec).unwrap();
        assert_eq!(store.list(&ListFilter::all()).unwrap().len(), 1);

        let mut conflicting = rec.clone();
        conflicting.recipient_name = "Someone Else".to_owned();
        assert!(matches!(
            store.create(&conflicting),
            Err(CertiqError::DuplicateId(_))
        ));
    }

    #[test]
    fn update_status_persists_and_preserves_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record(1, "Jane Doe");
        store.create(&rec).unwrap();

        assert!(store.update_status(&rec.id, CertificateStatus::Revoked).unwrap());
        let loaded = store.get(&rec.id).unwrap().unwrap();
        assert_eq!(loaded.status, CertificateStatus::Revoked);
        assert_eq!(loaded.id, rec.id);
        assert!(loaded.updated_at >= rec.updated_at);

        let missing = Token::mint(42, &[9; 6]);
        assert!(!store.update_status(&missing, CertificateStatus::Pending).unwrap());
    }

    #[test]
    fn list_newest_first_with_search() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = record(1, "Jane Doe");
        let b = record(2, "John Roe");
        store.create(&a).unwrap();
        store.create(&b).unwrap();

        let all = store.list(&ListFilter::all()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, b.id, "newest first");

        let found = store.list(&ListFilter::search(a.id.as_str())).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    #[test]
    fn delete_clear_and_summary() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = record(1, "Jane Doe");
        let mut b = record(2, "John Roe");
        b.status = CertificateStatus::Pending;
        store.create(&a).unwrap();
        store.create(&b).unwrap();

        let summary = store.status_summary().unwrap();
        assert_eq!(summary.issued, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.total(), 2);

        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());

        store.clear().unwrap();
        assert!(store.list(&ListFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn reopen_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        let rec = record(1, "Jane Doe");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.create(&rec).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.get(&rec.id).unwrap().expect("record must survive reopen");
        assert_eq!(loaded.recipient_name, "Jane Doe");
    }

    #[test]
    fn draft_save_load_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_draft().unwrap().is_none());

        let draft = CertificateDraft {
            full_name: "Jane Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            program: "BS Nursing".to_owned(),
            ..CertificateDraft::default()
        };
        store.save_draft(&draft).unwrap();
        assert_eq!(store.load_draft().unwrap(), Some(draft.clone()));

        // Saving again overwrites the single slot.
        let mut updated = draft;
        updated.full_name = "Jane Q. Doe".to_owned();
        store.save_draft(&updated).unwrap();
        assert_eq!(store.load_draft().unwrap(), Some(updated));
    }
}
