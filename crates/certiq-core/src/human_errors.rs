// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Human-readable error messages for issuance and verification flows.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses three severity levels that drive UI presentation.

use crate::error::CertiqError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Momentary problem — retrying is likely to succeed.
    Transient,
    /// User must do something (fix a field, grant camera permission).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the system should auto-retry.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `CertiqError` into a `HumanError` anyone can act on.
pub fn humanize_error(err: &CertiqError) -> HumanError {
    match err {
        // -- Issuance errors --
        CertiqError::Validation(detail) => HumanError {
            message: "The form isn't complete yet.".into(),
            suggestion: detail.clone(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertiqError::NotPermitted => HumanError {
            message: "You're not signed in to issue certificates.".into(),
            suggestion: "Sign in with an issuer account, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertiqError::DuplicateId(id) => HumanError {
            message: "That certificate ID is already taken.".into(),
            suggestion: format!("A certificate with ID {id} already exists. Issue again to get a fresh ID."),
            retriable: true,
            severity: Severity::Transient,
        },

        CertiqError::CollisionExhausted { .. } => HumanError {
            message: "We couldn't generate a unique certificate ID.".into(),
            suggestion: "This is very unusual. Wait a moment and try issuing again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Codec errors --
        CertiqError::MalformedToken(_) => HumanError {
            message: "That doesn't look like a certificate ID.".into(),
            suggestion: "Check the code you scanned or typed. Certificate IDs look like TX-ABC123-XYZ789.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertiqError::Codec(_) => HumanError {
            message: "The QR code couldn't be created.".into(),
            suggestion: "The certificate ID may be damaged. Try issuing the certificate again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Capture errors --
        CertiqError::Device(detail) => humanize_device_error(detail),

        // -- Storage --
        CertiqError::IntegrityMismatch { .. } => HumanError {
            message: "This certificate record has been changed since it was issued.".into(),
            suggestion: "The stored copy doesn't match its original fingerprint. Treat this certificate as suspect and re-verify with the issuer.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        CertiqError::Database(_) => HumanError {
            message: "The certificate registry had a problem.".into(),
            suggestion: "Try closing and reopening the app. Your certificates should still be there.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CertiqError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        CertiqError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Parse capture-device error details into human-readable messages.
fn humanize_device_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("permission") || lower.contains("denied") {
        HumanError {
            message: "The app isn't allowed to use the camera.".into(),
            suggestion: "Allow camera access in your browser or system settings, then start the scan again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("no device") || lower.contains("not found") || lower.contains("unavailable") {
        HumanError {
            message: "No camera was found.".into(),
            suggestion: "Plug in or enable a camera, or upload a photo of the QR code instead.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("busy") || lower.contains("in use") {
        HumanError {
            message: "The camera is being used by another app.".into(),
            suggestion: "Close the other app that's using the camera, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "The camera had a problem.".into(),
            suggestion: format!("Try starting the scan again. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_action_required() {
        let err = CertiqError::Validation("Recipient full name is required.".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
        assert_eq!(human.suggestion, "Recipient full name is required.");
    }

    #[test]
    fn permission_denied_is_action_required() {
        let err = CertiqError::Device("camera permission denied by user".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn busy_camera_is_transient() {
        let err = CertiqError::Device("device busy: already in use".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn collision_exhaustion_is_retriable() {
        let err = CertiqError::CollisionExhausted { attempts: 5 };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn malformed_token_is_action_required() {
        let err = CertiqError::MalformedToken("bad segment".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }
}
