//! Reader construction configuration, in the spirit of the teacher's
//! `Locking`/`RelationalDB` constructors taking explicit config rather
//! than hardcoding pool sizing and pragmas.

/// Tuning knobs for [`crate::LdbReader::open`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Max number of pooled reader connections. Bounds how much true
    /// concurrency the Reader can extract from the store (spec §5).
    pub max_connections: u32,
    /// Per-connection capacity of rusqlite's built-in prepared-statement
    /// LRU (`Connection::set_prepared_statement_cache_capacity`).
    pub statement_cache_capacity: usize,
    /// `PRAGMA busy_timeout` applied to every pooled connection, so a
    /// writer holding a brief exclusive lock doesn't surface as an error
    /// to readers.
    pub busy_timeout: std::time::Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_connections: 8,
            statement_cache_capacity: 64,
            busy_timeout: std::time::Duration::from_millis(500),
        }
    }
}
