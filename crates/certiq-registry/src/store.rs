// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Storage interfaces — any persistent key-value or document store can stand
// behind these traits; the engine never assumes more than exact-match id
// lookup and idempotent writes.

use certiq_core::error::Result;
use certiq_core::types::{CertificateDraft, CertificateRecord, CertificateStatus, ListFilter, StatusSummary};
use certiq_core::token::Token;

/// Pluggable certificate record store.
///
/// Contract:
/// - `create` is idempotent on `id`: replaying an identical record is a
///   no-op; a different record under an existing id fails with
///   `CertiqError::DuplicateId`.
/// - `id` is immutable — no operation rewrites it. Status and metadata
///   change only through `update_status`.
/// - `list` returns newest-first.
pub trait RecordStore {
    /// Persist a new record.
    fn create(&self, record: &CertificateRecord) -> Result<()>;

    /// Exact-match lookup by token.
    fn get(&self, id: &Token) -> Result<Option<CertificateRecord>>;

    /// Whether a record with this token exists.
    fn contains(&self, id: &Token) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Change a record's lifecycle status. Returns false when no record
    /// carries this id.
    fn update_status(&self, id: &Token, status: CertificateStatus) -> Result<bool>;

    /// Remove a record. Returns false when no record carries this id.
    fn delete(&self, id: &Token) -> Result<bool>;

    /// List records passing `filter`, newest first.
    fn list(&self, filter: &ListFilter) -> Result<Vec<CertificateRecord>>;

    /// Per-status record counts.
    fn status_summary(&self) -> Result<StatusSummary>;

    /// Remove every record.
    fn clear(&self) -> Result<()>;
}

/// Single-slot draft persistence for the issuance form.
pub trait DraftStore {
    /// Save (or overwrite) the current draft.
    fn save_draft(&self, draft: &CertificateDraft) -> Result<()>;

    /// Load the current draft, if any.
    fn load_draft(&self) -> Result<Option<CertificateDraft>>;
}
