// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Draft validation — required-field and address-shape checks applied before
// any token is generated.

use certiq_core::error::{CertiqError, Result};
use certiq_core::types::CertificateDraft;

/// Basic address-shape check: some text, an `@`, a dotted domain, no
/// whitespace. Deliverability is not this module's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tld)) => !head.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Check a draft before issuance.
///
/// Fields are checked in the order the form presents them; the first failure
/// wins and issuance does not proceed.
pub fn validate_draft(draft: &CertificateDraft) -> Result<()> {
    if draft.full_name.trim().is_empty() {
        return Err(CertiqError::Validation(
            "Recipient full name is required.".into(),
        ));
    }
    if draft.program.trim().is_empty() {
        return Err(CertiqError::Validation("Please select a program.".into()));
    }
    if !is_valid_email(draft.email.trim()) {
        return Err(CertiqError::Validation(
            "Please enter a valid email address.".into(),
        ));
    }
    Ok(())
}
