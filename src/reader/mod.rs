//! The LDB Reader: a concurrent, caching lookup façade over the local
//! control-data database (spec §2, §4).

pub mod freshness;
pub mod rows;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;

use crate::cache::pk::PkCache;
use crate::cache::stmt::StmtCache;
use crate::cancel::Cancel;
use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::metrics::{LatencyTimer, METRICS};
use crate::names::{FamilyName, LocalTableName, TableName};
use crate::schema::Row;
use crate::sink::RowSink;
use crate::types::{KeyValue, SqlValue};
use rows::RowIter;

/// A long-lived, thread-shareable handle onto a local embedded control-data
/// database (spec §2, §5).
///
/// `LdbReader` owns a pool of read-only connections plus the two
/// process-local caches described by the spec: a primary-key descriptor
/// cache and a prepared-statement (SQL text) cache. All public methods
/// are safe to call concurrently from any number of threads.
pub struct LdbReader {
    pool: Pool<SqliteConnectionManager>,
    pk_cache: PkCache,
    stmt_cache: StmtCache,
    closed: AtomicBool,
}

impl LdbReader {
    /// Opens a reader against the SQLite file at `path`. The file is
    /// expected to already exist, kept current by an external ledger
    /// reflector; the Reader itself never writes to it.
    pub fn open(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        let capacity = config.statement_cache_capacity;
        let busy_timeout = config.busy_timeout;

        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .with_init(move |conn| {
                conn.busy_timeout(busy_timeout)?;
                conn.set_prepared_statement_cache_capacity(capacity);
                Ok(())
            });

        let pool = Pool::builder().max_size(config.max_connections).build(manager)?;

        Ok(Self {
            pool,
            pk_cache: PkCache::default(),
            stmt_cache: StmtCache::default(),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Point lookup by full primary key (spec §4.1).
    pub fn get_row_by_key<S: RowSink>(&self, family: &str, table: &str, key: &[KeyValue], out: &mut S) -> Result<bool> {
        self.get_row_by_key_cancellable(family, table, key, out, &Cancel::never())
    }

    pub fn get_row_by_key_cancellable<S: RowSink>(
        &self,
        family: &str,
        table: &str,
        key: &[KeyValue],
        out: &mut S,
        cancel: &Cancel,
    ) -> Result<bool> {
        self.ensure_open()?;
        cancel.check()?;

        let fam = FamilyName::new(family)?;
        let tbl = TableName::new(table)?;
        let local = LocalTableName::compose(&fam, &tbl);

        let conn = self.pool.get()?;
        let pk = self.pk_cache.get_or_populate(&local, &conn)?;

        if pk.is_empty() {
            return Err(Error::TableHasNoPrimaryKey(local.to_string()));
        }
        if key.len() != pk.arity() {
            return Err(Error::NeedFullKey {
                table: local.to_string(),
                want: pk.arity(),
                got: key.len(),
            });
        }

        let coerced: Vec<KeyValue> = key
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, v)| v.coerce(pk.field_type_at(i).expect("i < arity checked above")))
            .collect();

        cancel.check()?;
        let _timer = LatencyTimer::start(family, table, "get");
        let stmt_entry = self.stmt_cache.point(&local, &pk);

        let mut stmt = match conn.prepare_cached(&stmt_entry.sql) {
            Ok(stmt) => stmt,
            Err(e) => {
                self.pk_cache.invalidate(&local);
                return Err(Error::Sql(e));
            }
        };

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let params: Vec<&dyn rusqlite::ToSql> = coerced.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

        let decoded = stmt.query_row(params.as_slice(), |row| {
            let mut decoded = Row::new();
            for (i, name) in names.iter().enumerate() {
                let value: SqlValue = row.get_ref(i)?.into();
                decoded.push(name.clone(), value);
            }
            Ok(decoded)
        });

        match decoded {
            Ok(decoded) => {
                for (name, value) in decoded.iter() {
                    out.set(name, value.clone())?;
                }
                Ok(true)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => {
                self.pk_cache.invalidate(&local);
                Err(Error::Sql(e))
            }
        }
    }

    /// Prefix scan over the leading `prefix.len()` primary-key columns
    /// (spec §4.2). The returned cursor must be explicitly dropped (or
    /// have [`rows::RowIter::close`] called) when the caller is done with
    /// it.
    pub fn get_rows_by_key_prefix(&self, family: &str, table: &str, prefix: &[KeyValue]) -> Result<RowIter> {
        self.get_rows_by_key_prefix_cancellable(family, table, prefix, Cancel::never())
    }

    pub fn get_rows_by_key_prefix_cancellable(
        &self,
        family: &str,
        table: &str,
        prefix: &[KeyValue],
        cancel: Cancel,
    ) -> Result<RowIter> {
        self.ensure_open()?;
        cancel.check()?;

        let fam = FamilyName::new(family)?;
        let tbl = TableName::new(table)?;
        let local = LocalTableName::compose(&fam, &tbl);

        let conn = self.pool.get()?;
        let pk = self.pk_cache.get_or_populate(&local, &conn)?;

        if pk.is_empty() {
            return Err(Error::TableHasNoPrimaryKey(local.to_string()));
        }
        if prefix.len() > pk.arity() {
            return Err(Error::TooManyKeys {
                table: local.to_string(),
                arity: pk.arity(),
                got: prefix.len(),
            });
        }

        if prefix.is_empty() {
            METRICS.full_table_scans_total.with_label_values(&[family, table]).inc();
            log::warn!("full-table-scan issued against `{local}`");
        }

        let coerced: Vec<KeyValue> = prefix
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, v)| v.coerce(pk.field_type_at(i).expect("i < arity checked above")))
            .collect();

        let _timer = LatencyTimer::start(family, table, "prefix");
        let stmt_entry = self.stmt_cache.prefix(&local, prefix.len(), &pk);
        let params: Vec<&dyn rusqlite::ToSql> = coerced.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

        RowIter::open(conn, &stmt_entry.sql, &params, family.to_owned(), table.to_owned(), cancel)
    }

    /// Highest ledger entry sequence applied to this local database (spec
    /// §4.3).
    pub fn get_last_sequence(&self) -> Result<i64> {
        self.ensure_open()?;
        let conn = self.pool.get()?;
        freshness::last_sequence(&conn)
    }

    /// How stale this local view is relative to the authoritative ledger
    /// (spec §4.3).
    pub fn get_ledger_latency(&self) -> Result<Duration> {
        self.ensure_open()?;
        let conn = self.pool.get()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the unix epoch")
            .as_secs() as i64;
        freshness::ledger_latency(&conn, now)
    }

    /// Liveness probe, safe to call from health-check hot paths: never
    /// raises, collapsing every failure to `false` (spec §4.3, §9).
    pub fn ping(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        match self.pool.get() {
            Ok(conn) => freshness::ping(&conn),
            Err(_) => false,
        }
    }

    /// Marks the Reader closed and drops its caches. Subsequent operations
    /// fail with [`Error::Closed`] (spec §5).
    pub fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.pk_cache.clear();
        self.stmt_cache.clear();
        Ok(())
    }
}
