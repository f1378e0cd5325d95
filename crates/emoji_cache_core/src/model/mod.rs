//! Domain model for cached reference data.
//!
//! # Responsibility
//! - Define stored entry shapes and the partition key space.
//!
//! # Invariants
//! - Every stored record lives in exactly one partition.
//! - Partition identifiers are either a supported `Locale` or `custom`.

pub mod entry;
pub mod locale;
