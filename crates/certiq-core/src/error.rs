// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Unified error types for Certiq.

use thiserror::Error;

/// Top-level error type for all Certiq operations.
///
/// A failed decode attempt is deliberately NOT an error — "no code in this
/// frame" is a normal outcome modelled by `DecodeOutcome::NotFound` in the
/// codec crate. Only conditions that stop an operation appear here.
#[derive(Debug, Error)]
pub enum CertiqError {
    // -- Issuance errors --
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("issuance not permitted for the current session")]
    NotPermitted,

    #[error("certificate id already exists: {0}")]
    DuplicateId(String),

    #[error("token generation exhausted after {attempts} collision retries")]
    CollisionExhausted { attempts: u32 },

    // -- Codec errors --
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("QR encoding failed: {0}")]
    Codec(String),

    // -- Capture errors --
    #[error("capture device error: {0}")]
    Device(String),

    // -- Storage / persistence --
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CertiqError>;
