// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Token generator — one unique, human-transcribable token per issuance event.

use std::sync::{Mutex, PoisonError};

use certiq_core::token::{TOKEN_RANDOM_LEN, Token};
use chrono::Utc;
use rand::Rng;

/// Produces `TX-<TIME36>-<RAND36>` tokens.
///
/// The time segment is strictly increasing across calls from one generator:
/// when several tokens are requested within the same clock millisecond, the
/// later ones advance the segment by one, so tokens from a single process
/// are pairwise distinct by construction. The random segment guards against
/// collisions across processes and restarts.
///
/// `generate` always succeeds — there is no error path.
#[derive(Debug, Default)]
pub struct TokenGenerator {
    /// Millisecond value used by the previous token from this generator.
    last_millis: Mutex<u64>,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token.
    pub fn generate(&self) -> Token {
        let now = Utc::now().timestamp_millis().max(0) as u64;

        let millis = {
            let mut last = self.last_millis.lock().unwrap_or_else(PoisonError::into_inner);
            let millis = now.max(*last + 1);
            *last = millis;
            millis
        };

        let mut random = [0u8; TOKEN_RANDOM_LEN];
        let mut rng = rand::thread_rng();
        for byte in &mut random {
            *byte = rng.gen_range(0..36);
        }

        Token::mint(millis, &random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_match_the_wire_format() {
        let generator = TokenGenerator::new();
        for _ in 0..100 {
            let token = generator.generate();
            let reparsed = Token::parse(token.as_str()).expect("generated token must parse");
            assert_eq!(reparsed, token);

            let text = token.as_str();
            assert!(text.starts_with("TX-"));
            assert_eq!(text.split('-').count(), 3);
            assert_eq!(token.random_segment().len(), TOKEN_RANDOM_LEN);
            assert!(
                text.bytes()
                    .all(|b| b == b'-' || b.is_ascii_digit() || b.is_ascii_uppercase()),
                "unexpected character in {text}"
            );
        }
    }

    #[test]
    fn ten_thousand_tokens_are_pairwise_distinct() {
        let generator = TokenGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let token = generator.generate();
            assert!(seen.insert(token.as_str().to_owned()), "duplicate token");
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn same_millisecond_calls_stay_distinct() {
        // Two immediate calls will usually land in the same clock
        // millisecond; the generator must still hand out distinct tokens.
        let generator = TokenGenerator::new();
        let first = generator.generate();
        let second = generator.generate();
        assert_ne!(first, second);
    }

    #[test]
    fn time_segment_is_monotonically_increasing() {
        let generator = TokenGenerator::new();
        let mut previous = 0u64;
        for _ in 0..50 {
            let token = generator.generate();
            let millis = u64::from_str_radix(token.timestamp_segment(), 36)
                .expect("time segment must be base 36");
            assert!(millis > previous);
            previous = millis;
        }
    }
}
