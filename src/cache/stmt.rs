//! The statement cache (spec §4.5).
//!
//! Two maps: local-table -> point-lookup statement text, and (local-table,
//! prefix-length) -> prefix-scan statement text. We cache the **SQL text**
//! here rather than a live `rusqlite::Statement`, since a `Statement<'conn>`
//! borrows its connection and our connections are pooled/checked-out per
//! call (spec's connection handle is "internally concurrency-safe", which
//! we realize as a connection pool rather than one long-lived handle -- see
//! DESIGN.md). The actual prepared statement is obtained per call from
//! whichever pooled connection is in hand via `Connection::prepare_cached`,
//! which maintains rusqlite's own per-connection LRU of prepared
//! statements keyed by this same SQL text. Caching the text here still
//! gives us the single stable place spec §4.5 describes for cache-key
//! discipline and for the convergence behavior in §4.4/§9: a stale cached
//! SQL text (wrong column list after a schema change) fails at execution
//! and triggers PK invalidation, after which the *next* miss on the PK
//! cache causes this statement entry to remain until it too next misses
//! (it is never invalidated in tandem, per spec).

use super::Cache;
use crate::names::LocalTableName;
use crate::schema::PrimaryKeyDescriptor;
use itertools::Itertools;
use std::convert::Infallible;

#[derive(Debug, Clone)]
pub struct StmtEntry {
    pub sql: String,
}

#[derive(Default)]
pub struct StmtCache {
    point: Cache<String, StmtEntry>,
    prefix: Cache<(String, usize), StmtEntry>,
}

impl StmtCache {
    pub fn point(&self, table: &LocalTableName, pk: &PrimaryKeyDescriptor) -> StmtEntry {
        let entry = self
            .point
            .get_or_try_populate::<Infallible>(&table.as_str().to_owned(), || Ok(build_point_sql(table, pk)));
        (*entry.expect("building point SQL text never fails")).clone()
    }

    pub fn prefix(&self, table: &LocalTableName, p: usize, pk: &PrimaryKeyDescriptor) -> StmtEntry {
        let key = (table.as_str().to_owned(), p);
        let entry = self
            .prefix
            .get_or_try_populate::<Infallible>(&key, || Ok(build_prefix_sql(table, p, pk)));
        (*entry.expect("building prefix SQL text never fails")).clone()
    }

    pub fn clear(&self) {
        self.point.clear();
        self.prefix.clear();
    }
}

fn build_prefix_sql(table: &LocalTableName, p: usize, pk: &PrimaryKeyDescriptor) -> StmtEntry {
    let mut sql = format!("SELECT * FROM \"{}\"", table.as_str());
    if p > 0 {
        let clauses = (0..p)
            .map(|i| format!("\"{}\" = ?", pk.column_name_at(i).expect("p <= arity checked by caller")))
            .join(" AND ");
        sql.push_str(" WHERE ");
        sql.push_str(&clauses);
    }
    StmtEntry { sql }
}

fn build_point_sql(table: &LocalTableName, pk: &PrimaryKeyDescriptor) -> StmtEntry {
    build_prefix_sql(table, pk.arity(), pk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{FamilyName, TableName};
    use crate::types::FieldType;

    fn local() -> LocalTableName {
        LocalTableName::compose(&FamilyName::new("animals").unwrap(), &TableName::new("species").unwrap())
    }

    #[test]
    fn point_sql_binds_every_pk_column_in_order() {
        let pk = PrimaryKeyDescriptor::new(vec![
            ("campaign".into(), FieldType::Text),
            ("slot".into(), FieldType::Integer),
        ]);
        let entry = StmtCache::default().point(&local(), &pk);
        assert_eq!(
            entry.sql,
            "SELECT * FROM \"animals___species\" WHERE \"campaign\" = ? AND \"slot\" = ?"
        );
    }

    #[test]
    fn prefix_sql_with_zero_keys_is_a_full_scan() {
        let pk = PrimaryKeyDescriptor::new(vec![("id".into(), FieldType::Integer)]);
        let entry = StmtCache::default().prefix(&local(), 0, &pk);
        assert_eq!(entry.sql, "SELECT * FROM \"animals___species\"");
    }

    #[test]
    fn caches_distinct_statements_per_arity() {
        let pk = PrimaryKeyDescriptor::new(vec![
            ("campaign".into(), FieldType::Text),
            ("slot".into(), FieldType::Integer),
        ]);
        let cache = StmtCache::default();
        let one = cache.prefix(&local(), 1, &pk);
        let two = cache.prefix(&local(), 2, &pk);
        assert_ne!(one.sql, two.sql);
        assert_eq!(cache.prefix.len(), 2);
    }
}
