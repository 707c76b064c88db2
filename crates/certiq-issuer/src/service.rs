// SPDX-License-Identifier: MIT OR Apache-2.0
//
// The issuance transaction — permission gate, validation, token minting with
// bounded collision retries, and persistence as a single operation.

use certiq_core::config::AppConfig;
use certiq_core::error::{CertiqError, Result};
use certiq_core::types::{CertificateDraft, CertificateRecord, CertificateStatus};
use certiq_registry::activity::ActivityLog;
use certiq_registry::integrity::record_fingerprint;
use certiq_registry::store::RecordStore;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::generator::TokenGenerator;
use crate::validate::validate_draft;

/// Identity gate consulted before any token is generated.
///
/// The engine is oblivious to how sessions authenticate; it only asks
/// whether the current actor may issue.
pub trait IssuePermission {
    fn can_issue(&self) -> bool;
}

/// Permission gate for single-user sessions where issuance is always
/// allowed.
pub struct AlwaysPermitted;

impl IssuePermission for AlwaysPermitted {
    fn can_issue(&self) -> bool {
        true
    }
}

/// Issues certificates against a record store.
///
/// `issue` is the only place a token is minted. A token either ends up
/// inside a persisted record or is discarded on collision — it never escapes
/// unpersisted, and nothing outside this call can regenerate it.
pub struct Issuer<'a> {
    store: &'a dyn RecordStore,
    permission: &'a dyn IssuePermission,
    activity: Option<&'a ActivityLog>,
    generator: TokenGenerator,
    config: AppConfig,
}

impl<'a> Issuer<'a> {
    pub fn new(store: &'a dyn RecordStore, permission: &'a dyn IssuePermission) -> Self {
        Self::with_config(store, permission, AppConfig::default())
    }

    pub fn with_config(
        store: &'a dyn RecordStore,
        permission: &'a dyn IssuePermission,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            permission,
            activity: None,
            generator: TokenGenerator::new(),
            config,
        }
    }

    /// Record successful issuances in `activity`.
    pub fn with_activity(mut self, activity: &'a ActivityLog) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Issue a certificate from `draft`.
    ///
    /// Steps, in order: permission gate, field validation, token minting
    /// with collision retries bounded by `max_generate_attempts`, persist,
    /// activity entry. Validation failures surface before any token exists;
    /// a failed persist leaves no partially-written record behind.
    #[instrument(skip_all, fields(recipient = %draft.full_name))]
    pub fn issue(&self, draft: &CertificateDraft) -> Result<CertificateRecord> {
        if !self.permission.can_issue() {
            return Err(CertiqError::NotPermitted);
        }
        validate_draft(draft)?;

        let attempts = self.config.max_generate_attempts.max(1);
        for attempt in 0..attempts {
            let token = self.generator.generate();

            if self.config.collision_check && self.store.contains(&token)? {
                warn!(attempt, token = %token, "token collided with an existing record");
                continue;
            }

            let now = Utc::now();
            let record = CertificateRecord {
                id: token,
                recipient_name: draft.full_name.trim().to_owned(),
                recipient_email: draft.email.trim().to_owned(),
                program: draft.program.clone(),
                certificate_title: draft.certificate_title.clone(),
                template: draft.template,
                issued_date: draft.completion_date.unwrap_or_else(|| now.date_naive()),
                status: CertificateStatus::Issued,
                created_at: now,
                updated_at: now,
            };

            match self.store.create(&record) {
                Ok(()) => {
                    info!(id = %record.id, "certificate issued");
                    self.log_issue(&record);
                    return Ok(record);
                }
                // The store saw an id we didn't — treat like a collision
                // and mint again.
                Err(CertiqError::DuplicateId(id)) => {
                    warn!(attempt, %id, "record store rejected duplicate id");
                    continue;
                }
                Err(other) => return Err(other),
            }
        }

        Err(CertiqError::CollisionExhausted { attempts })
    }

    /// Activity logging is advisory — a failed write never rolls back an
    /// issued certificate. The entry carries the record's fingerprint so
    /// later mutations of the stored record are detectable.
    fn log_issue(&self, record: &CertificateRecord) {
        let Some(activity) = self.activity else {
            return;
        };
        let fingerprint = match record_fingerprint(record) {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                warn!(%err, "failed to fingerprint issued record");
                return;
            }
        };
        if let Err(err) = activity.record("issue", record.id.as_str(), true, Some(&fingerprint)) {
            warn!(%err, "failed to record issuance in activity log");
        }
    }
}
