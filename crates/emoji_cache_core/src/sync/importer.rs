//! ETag-driven import of remote partitions into the cache store.
//!
//! # Responsibility
//! - Fetch a partition conditionally, presenting the stored validator.
//! - Decode, flatten and store modified data, then record the new validator.
//!
//! # Invariants
//! - A not-modified response writes nothing.
//! - Data is written before the validator, so a validator never outlives
//!   missing rows; an absent response validator keeps the stored one.
//! - The locale is marked loaded right after a non-empty write commits.
//! - No locking and no retries; the last concurrent writer wins.

use crate::model::entry::CustomEntry;
use crate::model::locale::{to_supported_locale, Locale, PartitionId};
use crate::repo::cache_repo::{CacheError, CacheStore};
use crate::sync::flatten::{flatten_compact_records, CompactRecord};
use crate::sync::source::RemoteSource;
use log::{error, info};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug)]
pub enum SyncError {
    /// The source publishes no resource for this locale.
    UnsupportedLocale(Locale),
    FetchFailed {
        partition: PartitionId,
        status: Option<u16>,
        detail: String,
    },
    MalformedResponse {
        partition: PartitionId,
        detail: String,
    },
    Cache(CacheError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLocale(locale) => write!(f, "unsupported locale: {locale}"),
            Self::FetchFailed {
                partition,
                status: Some(status),
                detail,
            } => write!(
                f,
                "failed to fetch emoji data for {partition}: status {status} {detail}"
            ),
            Self::FetchFailed {
                partition,
                status: None,
                detail,
            } => write!(f, "failed to fetch emoji data for {partition}: {detail}"),
            Self::MalformedResponse { partition, detail } => {
                write!(f, "unexpected data format for {partition}: {detail}")
            }
            Self::Cache(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cache(err) => Some(err),
            Self::UnsupportedLocale(_)
            | Self::FetchFailed { .. }
            | Self::MalformedResponse { .. } => None,
        }
    }
}

impl From<CacheError> for SyncError {
    fn from(value: CacheError) -> Self {
        Self::Cache(value)
    }
}

/// Result of one import call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The stored validator is still current; nothing was written.
    NotModified,
    /// `count` entries were written to the partition.
    Imported { count: usize },
}

struct FetchedRecords<T> {
    etag: Option<String>,
    records: Vec<T>,
}

/// Keeps cache partitions in step with a [`RemoteSource`].
pub struct EmojiImporter<S> {
    store: CacheStore,
    source: S,
}

impl<S: RemoteSource> EmojiImporter<S> {
    pub fn new(store: CacheStore, source: S) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Imports the unicode partition for `locale` if the remote copy changed.
    ///
    /// # Errors
    /// - `UnsupportedLocale` when the source has no resource for the locale.
    /// - `FetchFailed` for transport errors and non-2xx/304 statuses.
    /// - `MalformedResponse` when the body is not an array of records.
    /// - `Cache` for storage failures.
    pub fn import_locale_data(&self, locale: &str) -> SyncResult<ImportOutcome> {
        let locale = to_supported_locale(locale);
        let resource = self
            .source
            .locale_resource(locale)
            .ok_or(SyncError::UnsupportedLocale(locale))?;
        let partition = PartitionId::Locale(locale);

        let Some(fetched) = self.fetch_and_check_etag::<CompactRecord>(partition, &resource)?
        else {
            return Ok(ImportOutcome::NotModified);
        };

        let entries = flatten_compact_records(fetched.records);
        info!(
            "event=import module=sync status=fetched partition={} count={}",
            partition,
            entries.len()
        );
        self.store.put_unicode_entries(&entries, locale)?;
        if !entries.is_empty() {
            self.store.loaded_locales().mark_loaded(locale);
        }
        self.store_etag(fetched.etag.as_deref(), partition)?;

        Ok(ImportOutcome::Imported {
            count: entries.len(),
        })
    }

    /// Imports the custom partition if the remote copy changed.
    pub fn import_custom_data(&self) -> SyncResult<ImportOutcome> {
        let partition = PartitionId::Custom;
        let resource = self.source.custom_resource();

        let Some(fetched) = self.fetch_and_check_etag::<CustomEntry>(partition, &resource)? else {
            return Ok(ImportOutcome::NotModified);
        };

        info!(
            "event=import module=sync status=fetched partition={} count={}",
            partition,
            fetched.records.len()
        );
        self.store.put_custom_entries(&fetched.records)?;
        self.store_etag(fetched.etag.as_deref(), partition)?;

        Ok(ImportOutcome::Imported {
            count: fetched.records.len(),
        })
    }

    /// Returns `None` when the remote copy matches the stored validator.
    fn fetch_and_check_etag<T: DeserializeOwned>(
        &self,
        partition: PartitionId,
        resource: &str,
    ) -> SyncResult<Option<FetchedRecords<T>>> {
        let started_at = Instant::now();
        let old_etag = self.store.load_latest_etag(partition.as_str())?;

        let response = self
            .source
            .fetch(resource, old_etag.as_deref())
            .map_err(|err| {
                error!(
                    "event=import module=sync status=error partition={} error_code=transport_failed error={}",
                    partition, err
                );
                SyncError::FetchFailed {
                    partition,
                    status: None,
                    detail: err.to_string(),
                }
            })?;

        let status = StatusCode::from_u16(response.status).ok();
        if status == Some(StatusCode::NOT_MODIFIED) {
            info!(
                "event=import module=sync status=not_modified partition={} duration_ms={}",
                partition,
                started_at.elapsed().as_millis()
            );
            return Ok(None);
        }
        if !status.is_some_and(|status| status.is_success()) {
            error!(
                "event=import module=sync status=error partition={} error_code=bad_status http_status={}",
                partition, response.status
            );
            return Err(SyncError::FetchFailed {
                partition,
                status: Some(response.status),
                detail: status
                    .and_then(|status| status.canonical_reason())
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let records = decode_records(partition, &response.body).inspect_err(|err| {
            error!(
                "event=import module=sync status=error partition={} error_code=malformed_response error={}",
                partition, err
            );
        })?;

        Ok(Some(FetchedRecords {
            etag: response.etag,
            records,
        }))
    }

    fn store_etag(&self, etag: Option<&str>, partition: PartitionId) -> SyncResult<()> {
        if let Some(etag) = etag.filter(|etag| !etag.is_empty()) {
            self.store.put_etag(etag, partition)?;
        }
        Ok(())
    }
}

fn decode_records<T: DeserializeOwned>(partition: PartitionId, body: &[u8]) -> SyncResult<Vec<T>> {
    let malformed = |detail: String| SyncError::MalformedResponse { partition, detail };

    let value: Value = serde_json::from_slice(body).map_err(|err| malformed(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(malformed("expected an array".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| malformed(format!("record {index}: {err}")))
        })
        .collect()
}
