use std::path::PathBuf;

use ctlstore_ldb::{LdbReader, ReaderConfig};

/// Creates a fresh on-disk SQLite fixture and opens an `LdbReader` against
/// it. The `TempDir` must be kept alive for as long as the reader is used.
pub fn fixture(sql: &str) -> (tempfile::TempDir, LdbReader) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path: PathBuf = dir.path().join("ctlstore.db");

    {
        let conn = rusqlite::Connection::open(&path).expect("open fixture db");
        conn.execute_batch(sql).expect("apply fixture schema");
    }

    let reader = LdbReader::open(&path, ReaderConfig::default()).expect("open reader");
    (dir, reader)
}

pub fn reopen_conn(dir: &tempfile::TempDir) -> rusqlite::Connection {
    rusqlite::Connection::open(dir.path().join("ctlstore.db")).expect("reopen fixture db")
}
