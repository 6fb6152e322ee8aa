//! Freshness and liveness (spec §4.3).

use rusqlite::Connection;
use std::time::Duration;

use crate::error::{Error, Result};

/// Sentinel `id` of the single-row sequence table.
const SEQUENCE_SENTINEL_ID: i64 = 1;
/// Sentinel `name` of the last-ledger-update row in the update table.
const LAST_LEDGER_UPDATE_NAME: &str = "last_ledger_update";

pub(crate) fn last_sequence(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT seq FROM ctlstore_seq_number WHERE id = ?1",
        [SEQUENCE_SENTINEL_ID],
        |row| row.get(0),
    )
    .map_err(Error::Sql)
}

pub(crate) fn ledger_latency(conn: &Connection, now_unix_seconds: i64) -> Result<Duration> {
    let applied_at: i64 = conn
        .query_row(
            "SELECT timestamp FROM ctlstore_dbstr WHERE name = ?1",
            [LAST_LEDGER_UPDATE_NAME],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Error::NoLedgerUpdates,
            other => Error::Sql(other),
        })?;

    let delta = now_unix_seconds.saturating_sub(applied_at).max(0);
    Ok(Duration::from_secs(delta as u64))
}

/// Never raises: all failures collapse to `false` (spec §4.3, §7, §9).
pub(crate) fn ping(conn: &Connection) -> bool {
    conn.query_row(
        "SELECT seq FROM ctlstore_seq_number WHERE id = ?1",
        [SEQUENCE_SENTINEL_ID],
        |row| row.get::<_, Option<i64>>(0),
    )
    .map(|value| value.is_some())
    .unwrap_or(false)
}
