//! Resolver for the tables of a FROM clause

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::ast::{NamedTableNode, TableNode};
use crate::error::{ResolveError, Result};
use crate::resolver::dynamic::add_dynamic_columns;
use crate::resolver::refs::{ColumnRef, TableRef};
use crate::resolver::staleness::resolve_table;
use crate::resolver::ColumnResolver;
use crate::schema::ColumnFamily;
use crate::session::Session;

/// Alias, table name or schema-qualified table name a FROM entry answers to
///
/// `schema: None` is its own slot, not a wildcard over all schemas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LookupKey {
    schema: Option<String>,
    name: String,
}

impl LookupKey {
    fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// Resolves columns against every table visited in a FROM clause
#[derive(Debug, Default)]
pub struct MultiTableResolver {
    /// Declaration order, used for unqualified lookups
    tables: Vec<Arc<TableRef>>,
    table_map: HashMap<LookupKey, Vec<Arc<TableRef>>>,
}

impl MultiTableResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one FROM-clause node; only named tables are supported
    pub fn visit(&mut self, session: &Session, node: &TableNode) -> Result<()> {
        match node {
            TableNode::Named(named) => self.visit_named(session, named),
            TableNode::Join(_) => Err(ResolveError::not_supported("Joins")),
            TableNode::Bind(_) => Err(ResolveError::not_supported("Bind parameter tables")),
            TableNode::Derived(_) => Err(ResolveError::not_supported("Subqueries in FROM")),
        }
    }

    fn visit_named(&mut self, session: &Session, node: &NamedTableNode) -> Result<()> {
        let resolved = resolve_table(session, &node.name)?;
        let table = add_dynamic_columns(&resolved.table, &node.dynamic_columns)?;
        let table_ref = Arc::new(TableRef::new(
            node.alias.clone(),
            table,
            resolved.schema,
            resolved.timestamp,
        ));

        let table_name = table_ref.table().name().table.clone();
        let schema_name = table_ref.schema().name().to_string();
        if let Some(alias) = &node.alias {
            self.register(LookupKey::new(None, alias), &table_ref);
        }
        self.register(LookupKey::new(None, &table_name), &table_ref);
        self.register(LookupKey::new(Some(&schema_name), &table_name), &table_ref);
        self.tables.push(table_ref);
        Ok(())
    }

    fn register(&mut self, key: LookupKey, table_ref: &Arc<TableRef>) {
        let bucket = self.table_map.entry(key).or_default();
        if !bucket.iter().any(|t| Arc::ptr_eq(t, table_ref)) {
            bucket.push(table_ref.clone());
        }
    }

    fn resolve_table(&self, schema: Option<&str>, name: &str) -> Result<&Arc<TableRef>> {
        let bucket = self
            .table_map
            .get(&LookupKey::new(schema, name))
            .map(Vec::as_slice)
            .unwrap_or_default();
        match bucket {
            [table_ref] => Ok(table_ref),
            [] => Err(ResolveError::table_not_found(schema, name)),
            _ => Err(ResolveError::AmbiguousTable {
                table: name.to_string(),
            }),
        }
    }

    /// Find the single visible table owning family `family`
    ///
    /// More than one owner is reported as table-not-found, like no owner at
    /// all, rather than as an ambiguity.
    fn resolve_column_family(
        &self,
        table: Option<&str>,
        family: &str,
    ) -> Result<(&Arc<TableRef>, &ColumnFamily)> {
        if let Some(table) = table {
            let table_ref = self.resolve_table(None, table)?;
            let column_family = table_ref.table().column_family(family)?;
            return Ok((table_ref, column_family));
        }

        let mut owners = self.tables.iter().filter_map(|table_ref| {
            table_ref
                .table()
                .column_family(family)
                .ok()
                .map(|column_family| (table_ref, column_family))
        });
        match (owners.next(), owners.next()) {
            (Some(owner), None) => Ok(owner),
            _ => Err(ResolveError::table_not_found(None, family)),
        }
    }

    fn resolve_unqualified(&self, column: &str) -> Result<ColumnRef> {
        let mut found: Option<(&Arc<TableRef>, usize)> = None;
        for table_ref in &self.tables {
            match table_ref.table().column(column) {
                Ok(c) => {
                    if found.is_some() {
                        return Err(ResolveError::ambiguous_column(column));
                    }
                    found = Some((table_ref, c.position));
                }
                Err(ResolveError::ColumnNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        found
            .map(|(table_ref, position)| ColumnRef::new(table_ref.clone(), position))
            .ok_or_else(|| ResolveError::column_not_found(column))
    }
}

impl ColumnResolver for MultiTableResolver {
    fn tables(&self) -> &[Arc<TableRef>] {
        &self.tables
    }

    fn resolve_column(
        &self,
        schema: Option<&str>,
        table: Option<&str>,
        column: &str,
    ) -> Result<ColumnRef> {
        let schema = schema.filter(|s| !s.is_empty());
        let Some(qualifier) = table.filter(|t| !t.is_empty()) else {
            return self.resolve_unqualified(column);
        };

        let resolved = match self.resolve_table(schema, qualifier) {
            Ok(table_ref) => {
                let found = table_ref.table().column(column)?;
                ColumnRef::new(table_ref.clone(), found.position)
            }
            Err(ResolveError::TableNotFound { .. }) => {
                // `schema` now names the table and `qualifier` a family of it
                let (table_ref, family) = self.resolve_column_family(schema, qualifier)?;
                let found = family.column(column)?;
                ColumnRef::new(table_ref.clone(), found.position)
            }
            Err(e) => return Err(e),
        };
        trace!(qualifier, column, position = resolved.position(), "resolved column");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BindTableNode, DerivedTableNode, JoinKind, JoinTableNode};
    use crate::metadata::InMemoryProvider;
    use crate::schema::{ColumnSpec, TableBuilder, TableName};
    use crate::types::DataType;

    fn session() -> Session {
        let orders = TableBuilder::new("sales", "orders")
            .column(ColumnSpec::in_default_family("id", DataType::Long))
            .column(ColumnSpec::new("cf", "total", DataType::Decimal))
            .build()
            .unwrap();
        let items = TableBuilder::new("sales", "items")
            .column(ColumnSpec::in_default_family("id", DataType::Long))
            .column(ColumnSpec::new("cf", "qty", DataType::Integer))
            .column(ColumnSpec::new("extra", "note", DataType::Varchar))
            .build()
            .unwrap();
        Session::new(Arc::new(InMemoryProvider::from_tables([orders, items])))
    }

    fn named(table: &str) -> NamedTableNode {
        NamedTableNode::new(TableName::with_schema("sales", table))
    }

    #[test]
    fn test_registers_alias_name_and_schema_keys() {
        let session = session();
        let mut resolver = MultiTableResolver::new();
        resolver
            .visit(&session, &TableNode::Named(named("orders").with_alias("o")))
            .unwrap();

        let by_alias = resolver.resolve_column(None, Some("o"), "total").unwrap();
        let by_name = resolver.resolve_column(None, Some("orders"), "total").unwrap();
        let by_schema = resolver
            .resolve_column(Some("sales"), Some("orders"), "total")
            .unwrap();
        assert_eq!(by_alias, by_name);
        assert_eq!(by_name, by_schema);
        assert_eq!(by_alias.position(), 1);
    }

    #[test]
    fn test_alias_equal_to_table_name_is_not_ambiguous() {
        let session = session();
        let mut resolver = MultiTableResolver::new();
        resolver
            .visit(&session, &TableNode::Named(named("orders").with_alias("orders")))
            .unwrap();
        assert!(resolver.resolve_column(None, Some("orders"), "id").is_ok());
    }

    #[test]
    fn test_same_table_twice_is_ambiguous_by_name() {
        let session = session();
        let mut resolver = MultiTableResolver::new();
        resolver
            .visit(&session, &TableNode::Named(named("orders").with_alias("a")))
            .unwrap();
        resolver
            .visit(&session, &TableNode::Named(named("orders").with_alias("b")))
            .unwrap();

        assert_eq!(
            resolver.resolve_column(None, Some("orders"), "id").unwrap_err(),
            ResolveError::AmbiguousTable {
                table: "orders".to_string()
            }
        );
        let a = resolver.resolve_column(None, Some("a"), "id").unwrap();
        let b = resolver.resolve_column(None, Some("b"), "id").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_family_fallback_with_table_qualifier() {
        let session = session();
        let mut resolver = MultiTableResolver::new();
        resolver
            .visit(&session, &TableNode::Named(named("orders")))
            .unwrap();
        resolver
            .visit(&session, &TableNode::Named(named("items").with_alias("i")))
            .unwrap();

        // `i.cf.qty`: schema slot carries the alias, table slot the family
        let qty = resolver.resolve_column(Some("i"), Some("cf"), "qty").unwrap();
        assert_eq!(qty.table_ref().alias(), Some("i"));
        assert_eq!(qty.position(), 1);

        assert_eq!(
            resolver
                .resolve_column(Some("i"), Some("nope"), "qty")
                .unwrap_err(),
            ResolveError::family_not_found("nope")
        );
    }

    #[test]
    fn test_family_owned_by_two_tables_is_not_found() {
        let session = session();
        let mut resolver = MultiTableResolver::new();
        resolver
            .visit(&session, &TableNode::Named(named("orders")))
            .unwrap();
        resolver
            .visit(&session, &TableNode::Named(named("items")))
            .unwrap();

        // Coarse on purpose: two owners of `cf` report the same error as none
        assert_eq!(
            resolver.resolve_column(None, Some("cf"), "total").unwrap_err(),
            ResolveError::table_not_found(None, "cf")
        );
        assert_eq!(
            resolver.resolve_column(None, Some("zz"), "total").unwrap_err(),
            ResolveError::table_not_found(None, "zz")
        );

        let note = resolver.resolve_column(None, Some("extra"), "note").unwrap();
        assert_eq!(note.table_ref().table().name().table, "items");
        assert_eq!(
            resolver.resolve_column(None, Some("extra"), "qty").unwrap_err(),
            ResolveError::column_not_found("qty")
        );
    }

    #[test]
    fn test_unsupported_nodes() {
        let session = session();
        let mut resolver = MultiTableResolver::new();

        let join = TableNode::Join(JoinTableNode {
            kind: JoinKind::Inner,
            left: Box::new(TableNode::Named(named("orders"))),
            right: Box::new(TableNode::Named(named("items"))),
        });
        for node in [
            join,
            TableNode::Bind(BindTableNode { index: 1 }),
            TableNode::Derived(DerivedTableNode { alias: None }),
        ] {
            let err = resolver.visit(&session, &node).unwrap_err();
            assert!(matches!(err, ResolveError::FeatureNotSupported { .. }));
        }
        assert!(resolver.tables().is_empty());
    }

    #[test]
    fn test_missing_table_fails_construction() {
        let session = session();
        let mut resolver = MultiTableResolver::new();
        let err = resolver
            .visit(&session, &TableNode::Named(named("nope")))
            .unwrap_err();
        assert_eq!(err, ResolveError::table_not_found(Some("sales"), "nope"));
    }
}
