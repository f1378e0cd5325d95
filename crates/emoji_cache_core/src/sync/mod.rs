//! Conditional synchronization against the remote data source.
//!
//! # Responsibility
//! - Define the remote source contract and its HTTP transport.
//! - Turn fetched payloads into stored partitions.

pub mod flatten;
pub mod importer;
pub mod source;
