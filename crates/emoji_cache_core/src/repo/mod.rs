//! Cache store over partitioned SQLite tables.
//!
//! # Responsibility
//! - Keep SQL details for entry, tag index and etag tables in one place.
//!
//! # Invariants
//! - Read paths reject undecodable persisted records instead of skipping them.
//! - Unicode reads are gated by the loaded-locale tracker.

pub mod cache_repo;
