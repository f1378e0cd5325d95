//! Shared, lazily-initialized storage handle.
//!
//! # Responsibility
//! - Open and migrate the cache database once per manager lifetime.
//! - Rebuild the loaded-locale set from stored row counts after opening.
//!
//! # Invariants
//! - Concurrent `open()` calls observe the same handle; initialization runs
//!   under the slot lock, so later callers wait for the in-flight attempt.
//! - A failed initialization is not published; the next `open()` retries.
//! - `reset()` takes the same lock and cannot interleave with an open.

use super::open::open_connection;
use super::schema::{count_rows, unicode_table};
use super::{DbLocation, DbResult};
use crate::load_state::LoadedLocales;
use crate::model::locale::Locale;
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One migrated connection shared by every cache operation.
#[derive(Debug)]
pub struct StorageHandle {
    conn: Mutex<Connection>,
}

impl StorageHandle {
    fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Locks the connection for one read or write unit.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the storage location and memoizes its open/migrate step.
#[derive(Debug)]
pub struct StorageManager {
    location: DbLocation,
    loaded: Arc<LoadedLocales>,
    slot: Mutex<Option<Arc<StorageHandle>>>,
}

impl StorageManager {
    pub fn new(location: DbLocation, loaded: Arc<LoadedLocales>) -> Self {
        Self {
            location,
            loaded,
            slot: Mutex::new(None),
        }
    }

    /// In-memory store with a private load tracker.
    pub fn in_memory() -> Self {
        Self::new(DbLocation::Memory, Arc::new(LoadedLocales::new()))
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    pub fn loaded_locales(&self) -> &Arc<LoadedLocales> {
        &self.loaded
    }

    /// Returns the shared handle, initializing it on first use.
    ///
    /// # Errors
    /// - Propagates open, pragma and migration failures unchanged.
    pub fn open(&self) -> DbResult<Arc<StorageHandle>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(self.initialize()?);
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Discards the published handle so the next `open()` starts from scratch.
    ///
    /// Handles already returned stay usable. For in-memory stores the next
    /// open sees an empty database.
    pub fn reset(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    pub fn is_open(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn initialize(&self) -> DbResult<StorageHandle> {
        let conn = open_connection(&self.location)?;
        sync_locales(&conn, &self.loaded)?;
        Ok(StorageHandle::new(conn))
    }
}

/// Replaces tracker membership with the locales that currently hold rows.
fn sync_locales(conn: &Connection, loaded: &LoadedLocales) -> DbResult<()> {
    let mut present = Vec::new();
    for locale in Locale::ALL {
        if has_locale(conn, locale, loaded)? {
            present.push(locale);
        }
    }

    let names: Vec<&str> = present.iter().map(|locale| locale.as_str()).collect();
    loaded.replace_all(present.iter().copied());
    info!(
        "event=locale_sync module=db status=ok loaded_count={} locales={}",
        names.len(),
        names.join(",")
    );
    Ok(())
}

fn has_locale(conn: &Connection, locale: Locale, loaded: &LoadedLocales) -> DbResult<bool> {
    if loaded.is_loaded(locale) {
        return Ok(true);
    }
    Ok(count_rows(conn, &unicode_table(locale))? > 0)
}
