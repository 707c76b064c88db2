// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Certiq — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod token;
pub mod types;

pub use config::AppConfig;
pub use error::CertiqError;
pub use token::Token;
pub use types::*;
