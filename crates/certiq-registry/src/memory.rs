// SPDX-License-Identifier: MIT OR Apache-2.0
//
// In-memory record store — ephemeral sessions and tests.

use std::sync::{Mutex, PoisonError};

use certiq_core::error::{CertiqError, Result};
use certiq_core::token::Token;
use certiq_core::types::{CertificateDraft, CertificateRecord, CertificateStatus, ListFilter, StatusSummary};
use chrono::Utc;
use tracing::debug;

use crate::store::{DraftStore, RecordStore};

/// Record store backed by a plain `Vec`, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CertificateRecord>>,
    draft: Mutex<Option<CertificateDraft>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryStore {
    fn create(&self, record: &CertificateRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = records.iter().find(|r| r.id == record.id) {
            if existing == record {
                // Idempotent replay of the same write.
                return Ok(());
            }
            return Err(CertiqError::DuplicateId(record.id.as_str().to_owned()));
        }
        records.push(record.clone());
        debug!(id = %record.id, "record created");
        Ok(())
    }

    fn get(&self, id: &Token) -> Result<Option<CertificateRecord>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().find(|r| &r.id == id).cloned())
    }

    fn update_status(&self, id: &Token, status: CertificateStatus) -> Result<bool> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.status = status;
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: &Token) -> Result<bool> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| &r.id != id);
        Ok(records.len() < before)
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<CertificateRecord>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn status_summary(&self) -> Result<StatusSummary> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut summary = StatusSummary::default();
        for record in records.iter() {
            match record.status {
                CertificateStatus::Issued => summary.issued += 1,
                CertificateStatus::Pending => summary.pending += 1,
                CertificateStatus::Revoked => summary.revoked += 1,
            }
        }
        Ok(summary)
    }

    fn clear(&self) -> Result<()> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(())
    }
}

impl DraftStore for MemoryStore {
    fn save_draft(&self, draft: &CertificateDraft) -> Result<()> {
        *self.draft.lock().unwrap_or_else(PoisonError::into_inner) = Some(draft.clone());
        Ok(())
    }

    fn load_draft(&self) -> Result<Option<CertificateDraft>> {
        Ok(self.draft.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
