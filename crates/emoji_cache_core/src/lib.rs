//! Local, versioned emoji cache with ETag-driven synchronization.
//! This crate owns the storage schema, the load-state gate and the import
//! protocol; transport and locale data files are supplied by the host.

pub mod config;
pub mod db;
pub mod load_state;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sync;

pub use config::{CacheConfig, ConfigError};
pub use db::{DbError, DbLocation, DbResult, StorageHandle, StorageManager};
pub use load_state::{LoadedLocales, LocaleNotLoaded};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::entry::{CustomEntry, UnicodeEntry};
pub use model::locale::{to_supported_locale, to_supported_locale_or_custom, Locale, PartitionId};
pub use repo::cache_repo::{CacheError, CacheResult, CacheStore};
pub use sync::flatten::{flatten_compact_records, CompactRecord};
pub use sync::importer::{EmojiImporter, ImportOutcome, SyncError, SyncResult};
pub use sync::source::{HttpSource, HttpSourceError, RemoteResponse, RemoteSource, TransportError};

use std::sync::Arc;

/// Builds a store for `config` with a fresh load tracker.
///
/// Storage is opened lazily on the first cache operation.
pub fn cache_store(config: &CacheConfig) -> CacheStore {
    let loaded = Arc::new(LoadedLocales::new());
    CacheStore::new(Arc::new(StorageManager::new(config.db_location(), loaded)))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
