// SPDX-License-Identifier: MIT OR Apache-2.0
//
// certiq-registry — Certificate record persistence for Certiq.
//
// Provides the pluggable `RecordStore`/`DraftStore` interfaces with SQLite and
// in-memory implementations, an append-only activity log, record
// fingerprinting, and token verification against stored records.

pub mod activity;
pub mod integrity;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod verify;

// Re-export the primary types so callers can use `certiq_registry::SqliteStore` etc.
pub use activity::{ActivityEntry, ActivityLog};
pub use integrity::{hash_bytes, record_fingerprint, verify_fingerprint};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{DraftStore, RecordStore};
pub use verify::{Verification, Verifier};
