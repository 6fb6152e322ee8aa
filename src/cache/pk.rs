//! The primary-key metadata cache (spec §4.4).

use super::Cache;
use crate::error::{Error, Result};
use crate::metrics::METRICS;
use crate::names::LocalTableName;
use crate::schema::{PrimaryKeyDescriptor, SharedPrimaryKey};
use crate::types::FieldType;
use rusqlite::Connection;

#[derive(Default)]
pub struct PkCache {
    inner: Cache<String, PrimaryKeyDescriptor>,
}

impl PkCache {
    /// Returns the primary-key descriptor for `table`, querying the
    /// store's metadata facility and populating the cache on first use
    /// (spec §4.4 algorithm).
    pub fn get_or_populate(&self, table: &LocalTableName, conn: &Connection) -> Result<SharedPrimaryKey> {
        self.inner
            .get_or_try_populate(&table.as_str().to_owned(), || load_primary_key(conn, table))
    }

    /// Invalidates the cached descriptor for `table`, the Reader's sole
    /// self-healing reaction to an observed point-lookup execution error
    /// (spec §4.4, §9).
    pub fn invalidate(&self, table: &LocalTableName) {
        self.inner.invalidate(&table.as_str().to_owned());
        METRICS
            .pk_cache_invalidations_total
            .with_label_values(&[table.as_str()])
            .inc();
        log::warn!("invalidated primary-key cache entry for table `{table}` after a store execution error");
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

fn load_primary_key(conn: &Connection, table: &LocalTableName) -> Result<PrimaryKeyDescriptor> {
    let sql = format!("PRAGMA table_info(\"{}\")", table.as_str());
    let mut stmt = conn.prepare(&sql)?;

    // (pk position, name, raw type)
    let mut columns: Vec<(i64, String, String)> = stmt
        .query_map([], |row| {
            let pk: i64 = row.get("pk")?;
            let name: String = row.get("name")?;
            let raw_type: String = row.get("type")?;
            Ok((pk, name, raw_type))
        })?
        .collect::<rusqlite::Result<_>>()?;

    columns.retain(|(pk, _, _)| *pk > 0);
    columns.sort_by_key(|(pk, _, _)| *pk);

    if columns.is_empty() {
        return probe_table_exists(conn, table).map(|()| PrimaryKeyDescriptor::EMPTY);
    }

    let descriptor = columns
        .into_iter()
        .map(|(_, name, raw_type)| (name, FieldType::from_raw_type(&raw_type)))
        .collect();

    log::debug!("populated primary-key cache entry for table `{table}`");
    Ok(PrimaryKeyDescriptor::new(descriptor))
}

/// Distinguishes "table exists but declares no primary key" from "table
/// does not exist" via a bounded single-row probe (spec §4.4 step 3).
fn probe_table_exists(conn: &Connection, table: &LocalTableName) -> Result<()> {
    let sql = format!("SELECT 1 FROM \"{}\" LIMIT 1", table.as_str());
    match conn.query_row(&sql, [], |_row| Ok(())) {
        Ok(()) | Err(rusqlite::Error::QueryReturnedNoRows) => Ok(()),
        Err(e) if e.to_string().contains("no such table") => Err(Error::TableNotFound(table.to_string())),
        Err(e) => Err(Error::Sql(e)),
    }
}
