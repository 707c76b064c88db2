// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Record integrity — SHA-256 fingerprints for tamper detection.

use certiq_core::error::{CertiqError, Result};
use certiq_core::types::CertificateRecord;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Fingerprint a certificate record.
///
/// The record is serialized to its canonical JSON form (field order is the
/// declaration order, so the bytes are deterministic for equal records) and
/// hashed. Any field change — including status — produces a new fingerprint.
pub fn record_fingerprint(record: &CertificateRecord) -> Result<String> {
    let canonical = serde_json::to_vec(record)?;
    Ok(hash_bytes(&canonical))
}

/// Verify that `record` still matches the expected fingerprint.
///
/// Returns `Ok(())` when the fingerprint matches, or
/// `Err(CertiqError::IntegrityMismatch)` with the expected and actual values
/// when it does not.
pub fn verify_fingerprint(record: &CertificateRecord, expected_hex: &str) -> Result<()> {
    let actual = record_fingerprint(record)?;
    if actual == expected_hex {
        Ok(())
    } else {
        Err(CertiqError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
