mod common;

use common::{entry, seed_locale};
use emoji_cache_core::{
    CacheError, CacheStore, DbLocation, LoadedLocales, Locale, StorageManager,
};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_opens_share_one_handle() {
    let manager = Arc::new(StorageManager::in_memory());
    let barrier = Arc::new(Barrier::new(8));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.open().unwrap()
            })
        })
        .collect();
    let handles: Vec<_> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();

    assert!(handles
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn sequential_opens_reuse_handle_until_reset() {
    let manager = StorageManager::in_memory();
    assert!(!manager.is_open());

    let first = manager.open().unwrap();
    let second = manager.open().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(manager.is_open());

    manager.reset();
    assert!(!manager.is_open());
    let third = manager.open().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
}

#[test]
fn failed_open_is_retried_on_next_call() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("not-yet-created");
    let manager = StorageManager::new(
        DbLocation::File(nested.join("emoji.sqlite3")),
        Arc::new(LoadedLocales::new()),
    );

    assert!(manager.open().is_err());
    assert!(!manager.is_open());

    std::fs::create_dir_all(&nested).unwrap();
    assert!(manager.open().is_ok());
    assert!(manager.is_open());
}

#[test]
fn opening_file_store_restores_loaded_locales_from_rows() {
    let dir = tempfile::tempdir().unwrap();
    let location = DbLocation::File(dir.path().join("emoji.sqlite3"));

    let writer = CacheStore::new(Arc::new(StorageManager::new(
        location.clone(),
        Arc::new(LoadedLocales::new()),
    )));
    seed_locale(
        &writer,
        Locale::De,
        &[entry("1F600", 0, Some(1), "grinsendes Gesicht", &[])],
    );
    drop(writer);

    let loaded = Arc::new(LoadedLocales::new());
    let reader = CacheStore::new(Arc::new(StorageManager::new(location, Arc::clone(&loaded))));
    assert!(!loaded.is_loaded(Locale::De));

    let found = reader.get_by_code("1F600", "de").unwrap().unwrap();
    assert_eq!(found.label, "grinsendes Gesicht");
    assert_eq!(loaded.snapshot(), vec![Locale::De]);
}

#[test]
fn reset_in_memory_store_with_cleared_tracker_gates_reads() {
    let store = CacheStore::new(Arc::new(StorageManager::in_memory()));
    seed_locale(
        &store,
        Locale::En,
        &[entry("1F600", 0, Some(1), "grinning face", &["smile"])],
    );
    assert!(store.get_by_code("1F600", "en").unwrap().is_some());

    store.storage().reset();
    store.loaded_locales().clear();

    let err = store.get_by_code("1F600", "en").unwrap_err();
    assert!(matches!(err, CacheError::LocaleNotLoaded(Locale::En)));
    assert_eq!(store.count_partition(Locale::En.into()).unwrap(), 0);
}
