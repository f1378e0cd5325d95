//! Cache store over the shared SQLite handle.
//!
//! # Responsibility
//! - Upsert unicode, custom and etag records per partition.
//! - Serve point, range and index queries over stored partitions.
//!
//! # Invariants
//! - Each `put_*` call commits in exactly one write transaction.
//! - Unicode reads fail with `LocaleNotLoaded` for untracked locales.
//! - Stored `record` JSON is the source of truth; indexed columns mirror it.
//! - Marking a locale loaded after a write is the importer's job.

use crate::db::schema::{
    count_rows, partition_table, unicode_table, unicode_tags_table, CUSTOM_TABLE, ETAG_TABLE,
};
use crate::db::{DbError, StorageManager};
use crate::load_state::{LoadedLocales, LocaleNotLoaded};
use crate::model::entry::{CustomEntry, UnicodeEntry};
use crate::model::locale::{to_supported_locale_or_custom, Locale, PartitionId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type CacheResult<T> = Result<T, CacheError>;

/// Error for cache store reads and writes.
#[derive(Debug)]
pub enum CacheError {
    Db(DbError),
    LocaleNotLoaded(Locale),
    InvalidData(String),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::LocaleNotLoaded(locale) => {
                write!(f, "{}", LocaleNotLoaded(*locale))
            }
            Self::InvalidData(message) => write!(f, "invalid cached record: {message}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::LocaleNotLoaded(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for CacheError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<LocaleNotLoaded> for CacheError {
    fn from(value: LocaleNotLoaded) -> Self {
        Self::LocaleNotLoaded(value.0)
    }
}

/// Upper bound of the composite `(group, order)` scan.
const ORDER_UPPER_BOUND: i64 = i64::MAX;

/// Partitioned cache store. Cloning shares the same storage manager.
#[derive(Debug, Clone)]
pub struct CacheStore {
    storage: Arc<StorageManager>,
}

impl CacheStore {
    pub fn new(storage: Arc<StorageManager>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    pub fn loaded_locales(&self) -> &Arc<LoadedLocales> {
        self.storage.loaded_locales()
    }

    /// Upserts `entries` into `locale`'s partition in one transaction.
    ///
    /// An existing `code` is replaced in full, including its tag index rows.
    pub fn put_unicode_entries(&self, entries: &[UnicodeEntry], locale: Locale) -> CacheResult<()> {
        let handle = self.storage.open()?;
        let mut conn = handle.connection();
        let table = unicode_table(locale);
        let tags_table = unicode_tags_table(locale);

        let tx = conn.transaction()?;
        {
            let mut upsert = tx.prepare(&format!(
                "INSERT INTO {table} (code, group_id, order_rank, label, record)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(code) DO UPDATE SET
                    group_id = excluded.group_id,
                    order_rank = excluded.order_rank,
                    label = excluded.label,
                    record = excluded.record;"
            ))?;
            let mut clear_tags = tx.prepare(&format!("DELETE FROM {tags_table} WHERE code = ?1;"))?;
            let mut insert_tag = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {tags_table} (code, tag) VALUES (?1, ?2);"
            ))?;

            for entry in entries {
                upsert.execute(params![
                    entry.code.as_str(),
                    entry.group,
                    entry.order,
                    entry.label.as_str(),
                    encode_record(entry)?,
                ])?;
                clear_tags.execute([entry.code.as_str()])?;
                for tag in &entry.tags {
                    insert_tag.execute(params![entry.code.as_str(), tag.to_lowercase()])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Upserts `entries` into the custom partition in one transaction.
    pub fn put_custom_entries(&self, entries: &[CustomEntry]) -> CacheResult<()> {
        let handle = self.storage.open()?;
        let mut conn = handle.connection();

        let tx = conn.transaction()?;
        {
            let mut upsert = tx.prepare(&format!(
                "INSERT INTO {CUSTOM_TABLE} (shortcode, category, record)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(shortcode) DO UPDATE SET
                    category = excluded.category,
                    record = excluded.record;"
            ))?;
            for entry in entries {
                upsert.execute(params![
                    entry.shortcode.as_str(),
                    entry.category.as_deref(),
                    encode_record(entry)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Stores the latest remote validator for `partition`.
    pub fn put_etag(&self, etag: &str, partition: PartitionId) -> CacheResult<()> {
        let handle = self.storage.open()?;
        let conn = handle.connection();
        conn.execute(
            &format!(
                "INSERT INTO {ETAG_TABLE} (partition_id, etag) VALUES (?1, ?2)
                 ON CONFLICT(partition_id) DO UPDATE SET etag = excluded.etag;"
            ),
            params![partition.as_str(), etag],
        )?;
        Ok(())
    }

    /// Returns the stored validator for `partition`, or `None` when the
    /// partition holds no rows (a stale etag without data is ignored).
    pub fn load_latest_etag(&self, partition: &str) -> CacheResult<Option<String>> {
        let partition = to_supported_locale_or_custom(partition);
        let handle = self.storage.open()?;
        let conn = handle.connection();
        if count_rows(&conn, &partition_table(partition))? == 0 {
            return Ok(None);
        }

        let etag = conn
            .query_row(
                &format!("SELECT etag FROM {ETAG_TABLE} WHERE partition_id = ?1;"),
                [partition.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(etag)
    }

    /// Number of records stored in `partition`.
    pub fn count_partition(&self, partition: PartitionId) -> CacheResult<u64> {
        let handle = self.storage.open()?;
        let conn = handle.connection();
        Ok(count_rows(&conn, &partition_table(partition))?)
    }

    pub fn get_by_code(&self, code: &str, locale: &str) -> CacheResult<Option<UnicodeEntry>> {
        let handle = self.storage.open()?;
        let locale = self.loaded_locales().resolve_loaded(locale)?;
        let conn = handle.connection();
        let entry = conn
            .query_row(
                &format!("SELECT record FROM {} WHERE code = ?1;", unicode_table(locale)),
                [code],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        entry.as_deref().map(decode_record).transpose()
    }

    /// Fetches the entries for `codes` with one bounded key-range scan.
    ///
    /// The scan covers `[min(codes), max(codes)]` and is then filtered down to
    /// exactly the requested codes. Output order is by code; duplicates in
    /// `codes` collapse.
    pub fn get_by_codes<S: AsRef<str>>(
        &self,
        codes: &[S],
        locale: &str,
    ) -> CacheResult<Vec<UnicodeEntry>> {
        let handle = self.storage.open()?;
        let locale = self.loaded_locales().resolve_loaded(locale)?;
        let wanted: HashSet<&str> = codes.iter().map(AsRef::as_ref).collect();
        let (Some(lower), Some(upper)) = (wanted.iter().min(), wanted.iter().max()) else {
            return Ok(Vec::new());
        };

        let conn = handle.connection();
        let scanned = query_records::<UnicodeEntry>(
            &conn,
            &format!(
                "SELECT record FROM {} WHERE code BETWEEN ?1 AND ?2 ORDER BY code;",
                unicode_table(locale)
            ),
            params![lower, upper],
        )?;
        Ok(scanned
            .into_iter()
            .filter(|entry| wanted.contains(entry.code.as_str()))
            .collect())
    }

    /// Entries having a tag that starts with `tag`, compared case-insensitively.
    pub fn get_by_tag(&self, tag: &str, locale: &str) -> CacheResult<Vec<UnicodeEntry>> {
        let handle = self.storage.open()?;
        let locale = self.loaded_locales().resolve_loaded(locale)?;
        let prefix = tag.to_lowercase();
        let conn = handle.connection();
        query_records(
            &conn,
            &format!(
                "SELECT e.record
                 FROM {entries} e
                 WHERE e.code IN (
                    SELECT t.code
                    FROM {tags} t
                    WHERE t.tag >= ?1
                      AND substr(t.tag, 1, length(?1)) = ?1
                 )
                 ORDER BY e.code;",
                entries = unicode_table(locale),
                tags = unicode_tags_table(locale),
            ),
            params![prefix],
        )
    }

    /// All entries of `group`, sorted by `order` ascending (missing as `0`).
    pub fn get_group(&self, group: i64, locale: &str) -> CacheResult<Vec<UnicodeEntry>> {
        let handle = self.storage.open()?;
        let locale = self.loaded_locales().resolve_loaded(locale)?;
        let conn = handle.connection();
        let mut entries = query_records::<UnicodeEntry>(
            &conn,
            &format!(
                "SELECT record FROM {} WHERE group_id = ?1;",
                unicode_table(locale)
            ),
            params![group],
        )?;
        entries.sort_by_key(UnicodeEntry::sort_order);
        Ok(entries)
    }

    /// Lowest-order entry of `group` via the composite index.
    ///
    /// Entries without an `order` are not part of the `(group, order)` range
    /// and are never returned here.
    pub fn get_group_icon(&self, group: i64, locale: &str) -> CacheResult<Option<UnicodeEntry>> {
        let handle = self.storage.open()?;
        let locale = self.loaded_locales().resolve_loaded(locale)?;
        let conn = handle.connection();
        let record = conn
            .query_row(
                &format!(
                    "SELECT record
                     FROM {}
                     WHERE group_id = ?1 AND order_rank BETWEEN ?2 AND ?3
                     ORDER BY group_id, order_rank, code
                     LIMIT 1;",
                    unicode_table(locale)
                ),
                params![group, 0_i64, ORDER_UPPER_BOUND],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        record.as_deref().map(decode_record).transpose()
    }

    pub fn get_custom_by_shortcode(&self, shortcode: &str) -> CacheResult<Option<CustomEntry>> {
        let handle = self.storage.open()?;
        let conn = handle.connection();
        let record = conn
            .query_row(
                &format!("SELECT record FROM {CUSTOM_TABLE} WHERE shortcode = ?1;"),
                [shortcode],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        record.as_deref().map(decode_record).transpose()
    }

    /// Custom-partition analog of [`CacheStore::get_by_codes`].
    pub fn get_custom_by_shortcodes<S: AsRef<str>>(
        &self,
        shortcodes: &[S],
    ) -> CacheResult<Vec<CustomEntry>> {
        let handle = self.storage.open()?;
        let wanted: HashSet<&str> = shortcodes.iter().map(AsRef::as_ref).collect();
        let (Some(lower), Some(upper)) = (wanted.iter().min(), wanted.iter().max()) else {
            return Ok(Vec::new());
        };

        let conn = handle.connection();
        let scanned = query_records::<CustomEntry>(
            &conn,
            &format!(
                "SELECT record FROM {CUSTOM_TABLE}
                 WHERE shortcode BETWEEN ?1 AND ?2
                 ORDER BY shortcode;"
            ),
            params![lower, upper],
        )?;
        Ok(scanned
            .into_iter()
            .filter(|entry| wanted.contains(entry.shortcode.as_str()))
            .collect())
    }
}

fn query_records<T: serde::de::DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> CacheResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_record_row(row)?);
    }
    Ok(records)
}

fn parse_record_row<T: serde::de::DeserializeOwned>(row: &Row<'_>) -> CacheResult<T> {
    let record: String = row.get("record")?;
    decode_record(&record)
}

fn decode_record<T: serde::de::DeserializeOwned>(record: &str) -> CacheResult<T> {
    serde_json::from_str(record).map_err(|err| CacheError::InvalidData(err.to_string()))
}

fn encode_record<T: serde::Serialize>(record: &T) -> CacheResult<String> {
    serde_json::to_string(record).map_err(|err| CacheError::InvalidData(err.to_string()))
}
