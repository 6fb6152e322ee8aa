use crate::names::MAX_NAME_LEN;
use thiserror::Error;

/// Errors surfaced by [`crate::LdbReader`].
///
/// The taxonomy mirrors spec §7: validation errors carry no side effects,
/// schema errors are stable named variants, store errors wrap the
/// underlying driver, and cancellation is distinguishable from both.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid name `{0}`: must be non-empty, <= {MAX_NAME_LEN} bytes, and match [a-z0-9_-]+")]
    InvalidName(String),

    #[error("table `{0}` has no primary key")]
    TableHasNoPrimaryKey(String),

    #[error("key has {got} value(s) but table `{table}` has a primary key of arity {want}; supply the full key")]
    NeedFullKey { table: String, want: usize, got: usize },

    #[error("prefix has {got} value(s) but table `{table}`'s primary key has only {arity} column(s)")]
    TooManyKeys { table: String, arity: usize, got: usize },

    #[error("table `{0}` not found")]
    TableNotFound(String),

    #[error("no ledger updates have been applied to this local database yet")]
    NoLedgerUpdates,

    #[error("reader is closed")]
    Closed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("destination does not support column `{0}`")]
    UnsupportedSink(String),

    #[error("failed to check out a pooled connection: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("store error: {0}")]
    Sql(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the handful of variants a caller can productively
    /// distinguish from a generic store error, per spec §6.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TableNotFound(_))
    }
}
