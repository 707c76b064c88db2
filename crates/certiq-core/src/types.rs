// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Core domain types for the Certiq certificate engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Lifecycle states of an issued certificate.
///
/// A record changes state only through explicit user action — there are no
/// automatic transitions. `Revoked` is the state the analytics views label
/// "fraud".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificateStatus {
    /// Issued and currently valid.
    Issued,
    /// Recorded but awaiting confirmation.
    Pending,
    /// Explicitly withdrawn; verification must flag it.
    Revoked,
}

impl CertificateStatus {
    /// Lowercase keyword used for storage and search matching.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Pending => "pending",
            Self::Revoked => "revoked",
        }
    }

    /// Parse the storage keyword back into a status.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "issued" => Some(Self::Issued),
            "pending" => Some(Self::Pending),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }

    /// Display label ("Issued", "Pending", "Revoked").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Issued => "Issued",
            Self::Pending => "Pending",
            Self::Revoked => "Revoked",
        }
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The visual template a certificate is rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateTemplate {
    #[default]
    AcademicDegree,
    CourseCompletion,
    EmployeeId,
}

impl CertificateTemplate {
    /// Display name as shown in template pickers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AcademicDegree => "Academic Degree",
            Self::CourseCompletion => "Course Completion",
            Self::EmployeeId => "Employee ID",
        }
    }

    /// Parse a display name back into a template.
    pub fn from_display_name(name: &str) -> Option<Self> {
        match name {
            "Academic Degree" => Some(Self::AcademicDegree),
            "Course Completion" => Some(Self::CourseCompletion),
            "Employee ID" => Some(Self::EmployeeId),
            _ => None,
        }
    }
}

impl std::fmt::Display for CertificateTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A complete issued certificate record.
///
/// `id` is assigned once at issuance and never rewritten; every other field
/// may be updated through explicit store operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: Token,
    pub recipient_name: String,
    pub recipient_email: String,
    pub program: String,
    pub certificate_title: String,
    pub template: CertificateTemplate,
    pub issued_date: NaiveDate,
    pub status: CertificateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated issuance form data.
///
/// Everything a caller types before pressing "Issue". Serializable so a
/// session can save and restore a draft; validation happens at issuance,
/// not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateDraft {
    pub full_name: String,
    pub email: String,
    pub completion_date: Option<NaiveDate>,
    pub certificate_title: String,
    pub program: String,
    pub template: CertificateTemplate,
}

/// Per-status record counts for analytics views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub issued: u64,
    pub pending: u64,
    pub revoked: u64,
}

impl StatusSummary {
    pub fn total(&self) -> u64 {
        self.issued + self.pending + self.revoked
    }
}

/// Filter for registry listings.
///
/// `query` is matched case-insensitively against recipient name, token text
/// and status keyword; `status` narrows to one lifecycle state. An empty
/// filter lists everything, newest first.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub query: Option<String>,
    pub status: Option<CertificateStatus>,
}

impl ListFilter {
    /// Filter matching everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Free-text search filter.
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            status: None,
        }
    }

    /// Whether `record` passes this filter.
    pub fn matches(&self, record: &CertificateRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        match &self.query {
            None => true,
            Some(raw) => {
                let q = raw.trim().to_lowercase();
                if q.is_empty() {
                    return true;
                }
                record.recipient_name.to_lowercase().contains(&q)
                    || record.id.as_str().to_lowercase().contains(&q)
                    || record.status.as_str().contains(&q)
            }
        }
    }
}
