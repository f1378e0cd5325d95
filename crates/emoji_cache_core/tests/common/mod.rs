#![allow(dead_code)]

use emoji_cache_core::{
    CacheStore, Locale, RemoteResponse, RemoteSource, StorageManager, TransportError, UnicodeEntry,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CUSTOM_RESOURCE: &str = "api/v1/custom_emojis";

#[derive(Debug, Clone)]
pub struct Payload {
    pub status: u16,
    pub etag: Option<String>,
    pub body: Vec<u8>,
}

/// In-process source that honours `If-None-Match` and counts body transfers.
#[derive(Debug, Default)]
pub struct FakeSource {
    pub bundled: BTreeSet<Locale>,
    pub payloads: Mutex<HashMap<String, Payload>>,
    pub requests: Mutex<Vec<(String, Option<String>)>>,
    pub body_transfers: AtomicUsize,
    pub fail_transport: AtomicBool,
}

impl FakeSource {
    pub fn with_locales(locales: &[Locale]) -> Self {
        Self {
            bundled: locales.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn locale_path(locale: Locale) -> String {
        format!("emoji/{locale}/compact.json")
    }

    pub fn serve(&self, resource: &str, status: u16, etag: Option<&str>, body: &str) {
        self.payloads.lock().unwrap().insert(
            resource.to_string(),
            Payload {
                status,
                etag: etag.map(ToString::to_string),
                body: body.as_bytes().to_vec(),
            },
        );
    }

    pub fn serve_locale(&self, locale: Locale, etag: Option<&str>, body: &str) {
        self.serve(&Self::locale_path(locale), 200, etag, body);
    }

    pub fn transfers(&self) -> usize {
        self.body_transfers.load(Ordering::SeqCst)
    }

    pub fn last_validator(&self) -> Option<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|(_, validator)| validator.clone())
    }
}

impl RemoteSource for FakeSource {
    fn locale_resource(&self, locale: Locale) -> Option<String> {
        self.bundled
            .contains(&locale)
            .then(|| Self::locale_path(locale))
    }

    fn custom_resource(&self) -> String {
        CUSTOM_RESOURCE.to_string()
    }

    fn fetch(
        &self,
        resource: &str,
        if_none_match: Option<&str>,
    ) -> Result<RemoteResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((resource.to_string(), if_none_match.map(ToString::to_string)));
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(TransportError("connection reset".to_string()));
        }

        let payloads = self.payloads.lock().unwrap();
        let Some(payload) = payloads.get(resource) else {
            return Ok(RemoteResponse {
                status: 404,
                etag: None,
                body: Vec::new(),
            });
        };
        if payload.etag.is_some() && payload.etag.as_deref() == if_none_match {
            return Ok(RemoteResponse::not_modified());
        }

        self.body_transfers.fetch_add(1, Ordering::SeqCst);
        Ok(RemoteResponse {
            status: payload.status,
            etag: payload.etag.clone(),
            body: payload.body.clone(),
        })
    }
}

pub fn memory_store() -> CacheStore {
    CacheStore::new(Arc::new(StorageManager::in_memory()))
}

pub fn entry(code: &str, group: i64, order: Option<i64>, label: &str, tags: &[&str]) -> UnicodeEntry {
    let mut entry = UnicodeEntry::new(code, label);
    entry.group = Some(group);
    entry.order = order;
    entry.tags = tags.iter().map(ToString::to_string).collect();
    entry
}

/// Stores `entries` for `locale` and marks it loaded, as an import would.
pub fn seed_locale(store: &CacheStore, locale: Locale, entries: &[UnicodeEntry]) {
    store.put_unicode_entries(entries, locale).unwrap();
    store.loaded_locales().mark_loaded(locale);
}
