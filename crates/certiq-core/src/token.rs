// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Certificate token — the unique identifier assigned to one issuance event.
//
// Wire format: `TX-<TIME36>-<RAND36>`, all uppercase, hyphen-delimited.
// TIME36 is milliseconds since the Unix epoch in base 36; RAND36 is a
// fixed-length random base-36 segment that disambiguates same-millisecond
// issuances.

use serde::{Deserialize, Serialize};

use crate::error::{CertiqError, Result};

/// Constant prefix marker carried by every token.
pub const TOKEN_PREFIX: &str = "TX";

/// Length of the random base-36 segment.
pub const TOKEN_RANDOM_LEN: usize = 6;

/// Maximum digits a `u64` can occupy in base 36.
const TIME36_MAX_LEN: usize = 13;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A validated certificate token.
///
/// The inner string always matches the wire format exactly; the only ways to
/// obtain a `Token` are [`Token::mint`] (construction from parts, used by the
/// generator) and [`Token::parse`] (validation of external input, e.g. a
/// decoded QR payload). The token is immutable once assigned to a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Assemble a token from a millisecond timestamp and a random segment.
    ///
    /// Each random byte is reduced modulo 36 before mapping to the alphabet,
    /// so any byte source is acceptable. Infallible: every input produces a
    /// well-formed token.
    pub fn mint(timestamp_millis: u64, random: &[u8; TOKEN_RANDOM_LEN]) -> Self {
        let mut raw = String::with_capacity(TOKEN_PREFIX.len() + 2 + TIME36_MAX_LEN + TOKEN_RANDOM_LEN);
        raw.push_str(TOKEN_PREFIX);
        raw.push('-');
        raw.push_str(&encode_base36(timestamp_millis));
        raw.push('-');
        for &byte in random {
            raw.push(BASE36[(byte % 36) as usize] as char);
        }
        Self(raw)
    }

    /// Validate external input against the wire format.
    ///
    /// Accepts exactly `TX-<TIME36>-<RAND36>`: constant prefix, a non-empty
    /// uppercase base-36 timestamp of at most 13 digits, and a random segment
    /// of exactly [`TOKEN_RANDOM_LEN`] uppercase base-36 digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('-');
        let (prefix, time, random) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(t), Some(r), None) => (p, t, r),
            _ => {
                return Err(CertiqError::MalformedToken(format!(
                    "expected three hyphen-delimited segments, got {raw:?}"
                )));
            }
        };

        if prefix != TOKEN_PREFIX {
            return Err(CertiqError::MalformedToken(format!(
                "unknown prefix {prefix:?}"
            )));
        }
        if time.is_empty() || time.len() > TIME36_MAX_LEN || !is_base36_upper(time) {
            return Err(CertiqError::MalformedToken(format!(
                "invalid timestamp segment {time:?}"
            )));
        }
        if random.len() != TOKEN_RANDOM_LEN || !is_base36_upper(random) {
            return Err(CertiqError::MalformedToken(format!(
                "invalid random segment {random:?}"
            )));
        }

        Ok(Self(raw.to_owned()))
    }

    /// The token text, suitable for display and QR embedding.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base-36 timestamp segment (between the two hyphens).
    pub fn timestamp_segment(&self) -> &str {
        self.0.split('-').nth(1).unwrap_or_default()
    }

    /// The random segment (after the second hyphen).
    pub fn random_segment(&self) -> &str {
        self.0.split('-').nth(2).unwrap_or_default()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Token {
    type Error = CertiqError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Encode a `u64` in uppercase base 36 (most significant digit first).
pub fn encode_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = [0u8; TIME36_MAX_LEN];
    let mut used = 0;
    while value > 0 {
        digits[used] = BASE36[(value % 36) as usize];
        value /= 36;
        used += 1;
    }
    digits[..used].iter().rev().map(|&b| b as char).collect()
}

fn is_base36_upper(segment: &str) -> bool {
    segment
        .bytes()
        .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}
