//! Schema migration registry and executor.
//!
//! # Responsibility
//! - Create the custom, etag and per-locale partitions.
//! - Apply per-locale index steps in strictly increasing version order.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Every step is guarded by `IF [NOT] EXISTS`, so rerunning from the same
//!   starting version is a no-op.
//! - All steps run inside one transaction; the applied version is mirrored to
//!   `PRAGMA user_version` in that same transaction.

use crate::db::schema::{table_exists, unicode_table, unicode_tags_table, CUSTOM_TABLE, ETAG_TABLE};
use crate::db::{DbError, DbResult};
use crate::model::locale::Locale;
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct LocaleMigration {
    version: u32,
    description: &'static str,
    apply: fn(&Connection, Locale) -> DbResult<()>,
}

const LOCALE_MIGRATIONS: &[LocaleMigration] = &[
    LocaleMigration {
        version: 1,
        description: "group, label and tag indexes",
        apply: add_lookup_indexes,
    },
    LocaleMigration {
        version: 2,
        description: "composite group/order index",
        apply: add_group_order_index,
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    LOCALE_MIGRATIONS
        .last()
        .map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    upgrade_schema(&tx, current_version)?;
    tx.execute_batch(&format!("PRAGMA user_version = {latest};"))?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current_version, latest
    );
    Ok(())
}

/// Brings every partition from `old_version` up to [`latest_version`].
///
/// Does not touch `user_version`; callers run this inside their own
/// transaction. A locale table created by this call receives every step.
pub fn upgrade_schema(conn: &Connection, old_version: u32) -> DbResult<()> {
    ensure_custom_partition(conn)?;
    ensure_etag_partition(conn)?;

    for locale in Locale::ALL {
        let created = ensure_locale_partition(conn, locale)?;
        let baseline = if created { 0 } else { old_version };
        for migration in LOCALE_MIGRATIONS {
            if migration.version <= baseline {
                continue;
            }
            (migration.apply)(conn, locale)?;
            debug!(
                "event=db_migrate_step module=db status=ok locale={} version={} step=\"{}\"",
                locale, migration.version, migration.description
            );
        }
    }

    Ok(())
}

fn ensure_custom_partition(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {CUSTOM_TABLE} (
            shortcode TEXT PRIMARY KEY NOT NULL,
            category TEXT,
            record TEXT NOT NULL
        ) WITHOUT ROWID;
        CREATE INDEX IF NOT EXISTS idx_{CUSTOM_TABLE}_category ON {CUSTOM_TABLE}(category);"
    ))?;
    Ok(())
}

fn ensure_etag_partition(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {ETAG_TABLE} (
            partition_id TEXT PRIMARY KEY NOT NULL,
            etag TEXT NOT NULL
        ) WITHOUT ROWID;"
    ))?;
    Ok(())
}

/// Returns `true` when the partition table did not exist before this call.
fn ensure_locale_partition(conn: &Connection, locale: Locale) -> DbResult<bool> {
    let table = unicode_table(locale);
    if table_exists(conn, &table)? {
        return Ok(false);
    }

    conn.execute_batch(&format!(
        "CREATE TABLE {table} (
            code TEXT PRIMARY KEY NOT NULL,
            group_id INTEGER,
            order_rank INTEGER,
            label TEXT NOT NULL,
            record TEXT NOT NULL
        ) WITHOUT ROWID;"
    ))?;
    Ok(true)
}

fn add_lookup_indexes(conn: &Connection, locale: Locale) -> DbResult<()> {
    let table = unicode_table(locale);
    let tags = unicode_tags_table(locale);
    conn.execute_batch(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_group ON {table}(group_id);
        CREATE INDEX IF NOT EXISTS idx_{table}_label ON {table}(label);
        CREATE TABLE IF NOT EXISTS {tags} (
            code TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (code, tag)
        ) WITHOUT ROWID;
        CREATE INDEX IF NOT EXISTS idx_{tags}_tag ON {tags}(tag, code);"
    ))?;
    Ok(())
}

// A missing legacy `order` index is a no-op.
fn add_group_order_index(conn: &Connection, locale: Locale) -> DbResult<()> {
    let table = unicode_table(locale);
    conn.execute_batch(&format!(
        "DROP INDEX IF EXISTS idx_{table}_order;
        CREATE INDEX IF NOT EXISTS idx_{table}_group_order ON {table}(group_id, order_rank);"
    ))?;
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
