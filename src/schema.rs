//! Primary-key descriptors and decoded rows (spec §3).

use crate::types::{FieldType, SqlValue};
use std::sync::Arc;

/// An ordered (name, type) sequence identifying rows of a local table. The
/// empty sequence is the distinguished "no primary key" value (spec §3).
///
/// Invariant: for a given local table this is immutable for the lifetime
/// of that table in the store. A schema change drops and recreates the
/// table, which is only observable after the PK cache entry for it is
/// invalidated (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyDescriptor(Vec<(String, FieldType)>);

impl PrimaryKeyDescriptor {
    pub const EMPTY: PrimaryKeyDescriptor = PrimaryKeyDescriptor(Vec::new());

    pub fn new(columns: Vec<(String, FieldType)>) -> Self {
        Self(columns)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn columns(&self) -> &[(String, FieldType)] {
        &self.0
    }

    /// The field type declared at key position `i`, if any.
    pub fn field_type_at(&self, i: usize) -> Option<FieldType> {
        self.0.get(i).map(|(_, t)| *t)
    }

    pub fn column_name_at(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(|(name, _)| name.as_str())
    }
}

pub type SharedPrimaryKey = Arc<PrimaryKeyDescriptor>;

/// A single decoded result row, keyed by column name in result-set order
/// (spec §3: "the column set and types are discovered from statement
/// result metadata at query time, not from a schema catalog").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, value: SqlValue) {
        self.columns.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
