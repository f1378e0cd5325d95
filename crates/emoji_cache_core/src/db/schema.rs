//! Table naming for cache partitions.

use crate::db::DbResult;
use crate::model::locale::{Locale, PartitionId};
use rusqlite::Connection;

pub(crate) const CUSTOM_TABLE: &str = "custom_entries";
pub(crate) const ETAG_TABLE: &str = "etags";

/// Entry table for one locale partition, e.g. `unicode_en_gb`.
pub(crate) fn unicode_table(locale: Locale) -> String {
    format!("unicode_{}", locale.as_str().replace('-', "_"))
}

/// Multi-valued tag index backing one locale partition.
pub(crate) fn unicode_tags_table(locale: Locale) -> String {
    format!("{}_tags", unicode_table(locale))
}

pub(crate) fn partition_table(partition: PartitionId) -> String {
    match partition {
        PartitionId::Locale(locale) => unicode_table(locale),
        PartitionId::Custom => CUSTOM_TABLE.to_string(),
    }
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn count_rows(conn: &Connection, table: &str) -> DbResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    Ok(u64::try_from(count).unwrap_or(0))
}
