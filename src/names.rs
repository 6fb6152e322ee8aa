//! Family/table name validation and the local-table identifier composition
//! (spec §4.6). Implementations must agree bit-for-bit with the reflector
//! that creates these tables, so the charset policy and the separator are
//! not incidental — they are part of the wire contract with that external
//! component.

use crate::error::{Error, Result};

pub const MAX_NAME_LEN: usize = 64;

/// Local tables are named `<family>___<table>`. The triple underscore
/// can't collide with a validated name, since `_` is allowed but names are
/// never empty, so no valid family or table name can itself contain this
/// exact run bracketed the way the separator requires at a family/table
/// boundary ambiguity -- see DESIGN.md OQ-2.
const SEPARATOR: &str = "___";

fn is_valid_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

fn validate(kind: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || !name.chars().all(is_valid_char) {
        return Err(Error::InvalidName(format!("{kind} `{name}`")));
    }
    Ok(())
}

/// A validated family name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FamilyName(String);

impl FamilyName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate("family", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate("table", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The deterministic, case-stable composition of family and table into the
/// physical name used in the local store (spec §3, §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalTableName(String);

impl LocalTableName {
    pub fn compose(family: &FamilyName, table: &TableName) -> Self {
        Self(format!("{}{SEPARATOR}{}", family.as_str(), table.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocalTableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_oversized_names() {
        assert!(FamilyName::new("").is_err());
        assert!(FamilyName::new("a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn rejects_bad_charset() {
        assert!(FamilyName::new("Animals").is_err());
        assert!(FamilyName::new("animals!").is_err());
        assert!(TableName::new("species.v2").is_err());
    }

    #[test]
    fn accepts_charset_policy() {
        assert!(FamilyName::new("animals").is_ok());
        assert!(TableName::new("species-v2_final").is_ok());
    }

    #[test]
    fn composition_is_deterministic_and_case_stable() {
        let fam = FamilyName::new("animals").unwrap();
        let tbl = TableName::new("species").unwrap();
        let a = LocalTableName::compose(&fam, &tbl);
        let b = LocalTableName::compose(&fam, &tbl);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "animals___species");
    }
}
