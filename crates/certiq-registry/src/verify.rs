// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Token verification — compare a scanned or typed token against the record
// store and classify the outcome.

use certiq_core::error::Result;
use certiq_core::token::Token;
use certiq_core::types::{CertificateRecord, CertificateStatus};
use tracing::{debug, instrument, warn};

use crate::activity::ActivityLog;
use crate::integrity::record_fingerprint;
use crate::store::RecordStore;

/// Outcome of checking a scanned payload against the registry.
#[derive(Debug, Clone)]
pub enum Verification {
    /// The token names a stored record. The record's own status says
    /// whether the certificate is in good standing; `fingerprint` is its
    /// current integrity fingerprint for display alongside the result.
    Match {
        record: CertificateRecord,
        fingerprint: String,
    },
    /// A well-formed token with no record in the registry.
    Unknown { token: Token },
    /// The payload does not parse as a certificate token at all.
    Malformed { reason: String },
}

impl Verification {
    /// True only for a match whose record is currently `Issued`.
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            Self::Match { record, .. } if record.status == CertificateStatus::Issued
        )
    }
}

/// Verifies decoded payloads against a record store, optionally recording
/// each attempt in the activity log.
pub struct Verifier<'a> {
    store: &'a dyn RecordStore,
    activity: Option<&'a ActivityLog>,
}

impl<'a> Verifier<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            activity: None,
        }
    }

    /// Record every verification attempt in `activity`.
    pub fn with_activity(store: &'a dyn RecordStore, activity: &'a ActivityLog) -> Self {
        Self {
            store,
            activity: Some(activity),
        }
    }

    /// Verify a scanned or typed payload.
    ///
    /// Malformed payloads and unknown tokens are classified outcomes, not
    /// errors — only the store itself can fail here.
    #[instrument(skip(self))]
    pub fn verify(&self, payload: &str) -> Result<Verification> {
        let token = match Token::parse(payload) {
            Ok(token) => token,
            Err(err) => {
                let reason = err.to_string();
                debug!(%reason, "payload is not a certificate token");
                self.log_attempt(payload, false, Some(&reason));
                return Ok(Verification::Malformed { reason });
            }
        };

        match self.store.get(&token)? {
            Some(record) => {
                let fingerprint = record_fingerprint(&record)?;
                debug!(status = %record.status, "token matched a stored record");
                self.log_attempt(token.as_str(), true, Some(record.status.as_str()));
                Ok(Verification::Match {
                    record,
                    fingerprint,
                })
            }
            None => {
                debug!("token not present in registry");
                self.log_attempt(token.as_str(), false, Some("not in registry"));
                Ok(Verification::Unknown { token })
            }
        }
    }

    /// Activity logging is advisory — a failed write never fails the
    /// verification itself.
    fn log_attempt(&self, token: &str, success: bool, details: Option<&str>) {
        if let Some(activity) = self.activity {
            if let Err(err) = activity.record("verify", token, success, details) {
                warn!(%err, "failed to record verification in activity log");
            }
        }
    }
}
