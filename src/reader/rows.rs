//! The prefix-scan cursor (spec §4.2, §5): "single-pass, finite,
//! non-restartable, must be explicitly closed by the caller."
//!
//! `RowIter` owns both a checked-out pooled connection and a cursor
//! borrowing into it, which the borrow checker can't otherwise express as
//! a single struct. We use `ouroboros` for this, the same
//! self-referencing-struct pattern the wider example pack reaches for when
//! a type must own a resource and a live borrow into it together (see
//! DESIGN.md).

use std::cell::Cell;

use ouroboros::self_referencing;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{CachedStatement, Rows};

use crate::cancel::Cancel;
use crate::error::{Error, Result};
use crate::schema::Row;
use crate::types::SqlValue;

#[self_referencing]
pub struct RowIter {
    family: String,
    table: String,
    cancel: Cancel,
    exhausted: Cell<bool>,
    conn: PooledConnection<SqliteConnectionManager>,
    #[borrows(conn)]
    #[covariant]
    stmt: CachedStatement<'this>,
    #[borrows(stmt)]
    #[covariant]
    column_names: Vec<String>,
    #[borrows(mut stmt)]
    #[not_covariant]
    rows: Rows<'this>,
}

impl RowIter {
    pub(crate) fn open(
        conn: PooledConnection<SqliteConnectionManager>,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
        family: String,
        table: String,
        cancel: Cancel,
    ) -> Result<Self> {
        RowIterTryBuilder {
            family,
            table,
            cancel,
            exhausted: Cell::new(false),
            conn,
            stmt_builder: |conn| conn.prepare_cached(sql).map_err(Error::Sql),
            column_names_builder: |stmt| Ok(stmt.column_names().into_iter().map(str::to_owned).collect()),
            rows_builder: |stmt| stmt.query(params).map_err(Error::Sql),
        }
        .try_build()
    }

    /// Fetches the next row, or `None` once the cursor is exhausted.
    /// Observes cancellation before each fetch (spec §5).
    pub fn next(&mut self) -> Result<Option<Row>> {
        if self.borrow_exhausted().get() {
            return Ok(None);
        }
        self.borrow_cancel().check()?;

        let names = self.borrow_column_names().clone();
        let fetched = self.with_rows_mut(|rows| rows.next().map_err(Error::Sql))?;

        match fetched {
            Some(row) => {
                let mut decoded = Row::new();
                for (i, name) in names.iter().enumerate() {
                    let value = row.get_ref(i).map_err(Error::Sql)?;
                    decoded.push(name.clone(), SqlValue::from(value));
                }
                Ok(Some(decoded))
            }
            None => {
                self.borrow_exhausted().set(true);
                Ok(None)
            }
        }
    }

    pub fn family(&self) -> &str {
        self.borrow_family()
    }

    pub fn table(&self) -> &str {
        self.borrow_table()
    }

    pub fn column_names(&self) -> &[String] {
        self.borrow_column_names()
    }

    /// Releases the cursor and returns its pooled connection, per spec
    /// §5's "must be explicitly released."
    pub fn close(self) {
        drop(self);
    }
}

impl Iterator for RowIter {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match RowIter::next(self) {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
