//! `ctlstore-ldb`: the read path of a control-data distribution system.
//!
//! A small, centrally-authored dataset is replicated as a read-only
//! embedded SQLite database to every consuming process. This crate is the
//! hot component invoked on every lookup: a concurrent, caching façade
//! (`LdbReader`) over that local database, whose schema is driven entirely
//! by an external reflector and must be absorbed without restarting the
//! process.
//!
//! See `SPEC_FULL.md` for the full requirements this crate implements.

pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod names;
pub mod reader;
pub mod schema;
pub mod sink;
pub mod types;

pub use cancel::Cancel;
pub use config::ReaderConfig;
pub use error::{Error, Result};
pub use reader::rows::RowIter;
pub use reader::LdbReader;
pub use schema::{PrimaryKeyDescriptor, Row};
pub use sink::{NamedFieldSink, RowSink};
pub use types::{FieldType, KeyValue, SqlValue};
