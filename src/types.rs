//! The closed field-type enumeration (spec §3) and key coercion (spec
//! §4.7).

use rusqlite::types::{Value, ValueRef};
use rusqlite::ToSql;

/// Semantic storage types a primary-key column can declare. Closed by
/// design: a new variant here is a schema-evolution event, not something
/// callers extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Float,
    Text,
    ByteString,
    Binary,
    Timestamp,
    Json,
    Bool,
}

impl FieldType {
    /// Parses the raw `PRAGMA table_info` type-affinity string into the
    /// closed enumeration. Unknown/unaffiliated declarations fall back to
    /// `Text`, matching SQLite's own type-affinity rules (a column with no
    /// recognized affinity keyword gets TEXT affinity).
    pub fn from_raw_type(raw: &str) -> FieldType {
        let raw = raw.to_ascii_uppercase();
        if raw.contains("INT") {
            FieldType::Integer
        } else if raw.contains("BYTESTRING") {
            FieldType::ByteString
        } else if raw.contains("BLOB") || raw.contains("BINARY") {
            FieldType::Binary
        } else if raw.contains("TIMESTAMP") || raw.contains("DATETIME") {
            FieldType::Timestamp
        } else if raw.contains("JSON") {
            FieldType::Json
        } else if raw.contains("BOOL") {
            FieldType::Bool
        } else if raw.contains("REAL") || raw.contains("FLOA") || raw.contains("DOUB") {
            FieldType::Float
        } else {
            FieldType::Text
        }
    }

    /// Whether a textual key value bound against a column of this type
    /// must be reinterpreted as its raw byte encoding (spec §4.7's sole
    /// required transformation).
    pub fn coerces_text_to_bytes(self) -> bool {
        matches!(self, FieldType::Binary | FieldType::ByteString)
    }
}

/// A caller-supplied key value, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Null,
}

impl KeyValue {
    /// Coerces this value against the declared field type of the column it
    /// will be bound to (spec §4.7). Only a textual value destined for a
    /// binary/byte-string column is transformed; everything else passes
    /// through unchanged and is left to the driver.
    pub fn coerce(self, field_type: FieldType) -> KeyValue {
        match (self, field_type) {
            (KeyValue::Text(s), ft) if ft.coerces_text_to_bytes() => KeyValue::Bytes(s.into_bytes()),
            (other, _) => other,
        }
    }
}

impl ToSql for KeyValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        let value = match self {
            KeyValue::Integer(i) => Value::Integer(*i),
            KeyValue::Float(f) => Value::Real(*f),
            KeyValue::Text(s) => Value::Text(s.clone()),
            KeyValue::Bytes(b) => Value::Blob(b.clone()),
            KeyValue::Null => Value::Null,
        };
        Ok(rusqlite::types::ToSqlOutput::Owned(value))
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        KeyValue::Integer(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::Text(v.to_owned())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        KeyValue::Text(v)
    }
}

impl From<Vec<u8>> for KeyValue {
    fn from(v: Vec<u8>) -> Self {
        KeyValue::Bytes(v)
    }
}

/// A decoded column value from a result row (spec §3's "Row" model: types
/// are discovered from statement result metadata, not a schema catalog).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Null,
}

impl<'a> From<ValueRef<'a>> for SqlValue {
    fn from(v: ValueRef<'a>) -> Self {
        match v {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Float(f),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_affinities() {
        assert_eq!(FieldType::from_raw_type("INTEGER"), FieldType::Integer);
        assert_eq!(FieldType::from_raw_type("BIGINT"), FieldType::Integer);
        assert_eq!(FieldType::from_raw_type("TEXT"), FieldType::Text);
        assert_eq!(FieldType::from_raw_type("BLOB"), FieldType::Binary);
        assert_eq!(FieldType::from_raw_type("BINARY"), FieldType::Binary);
        assert_eq!(FieldType::from_raw_type("BYTESTRING"), FieldType::ByteString);
        assert_eq!(FieldType::from_raw_type("TIMESTAMP"), FieldType::Timestamp);
        assert_eq!(FieldType::from_raw_type("REAL"), FieldType::Float);
        assert_eq!(FieldType::from_raw_type("DOUBLE"), FieldType::Float);
        assert_eq!(FieldType::from_raw_type(""), FieldType::Text);
    }

    #[test]
    fn coerces_text_key_to_bytes_for_binary_columns() {
        let v = KeyValue::Text("abcd".into()).coerce(FieldType::Binary);
        assert_eq!(v, KeyValue::Bytes(b"abcd".to_vec()));
    }

    #[test]
    fn coercion_idempotent_for_already_typed_values() {
        let already_bytes = KeyValue::Bytes(b"abcd".to_vec()).coerce(FieldType::Binary);
        let from_text = KeyValue::Text("abcd".into()).coerce(FieldType::Binary);
        assert_eq!(already_bytes, from_text);
    }

    #[test]
    fn leaves_non_binary_coercions_untouched() {
        let v = KeyValue::Integer(42).coerce(FieldType::Integer);
        assert_eq!(v, KeyValue::Integer(42));
        let v = KeyValue::Text("x".into()).coerce(FieldType::Text);
        assert_eq!(v, KeyValue::Text("x".into()));
    }
}
