//! Column resolution against the tables a statement names
//!
//! A resolver is built once per statement from its FROM clause (or its
//! mutation target) and then answers `resolve_column` calls for every column
//! reference in that statement.

mod dynamic;
mod multi;
mod refs;
mod single;
mod staleness;

use std::sync::Arc;

use crate::ast::{ColumnDef, ColumnName, Statement, TableNode};
use crate::error::{ResolveError, Result};
use crate::session::Session;

pub use multi::MultiTableResolver;
pub use refs::{ColumnRef, TableRef};
pub use single::SingleTableResolver;

/// Resolves column references to a table and position
pub trait ColumnResolver {
    /// Tables in declaration order
    fn tables(&self) -> &[Arc<TableRef>];

    /// Resolve `[schema.][table.]column`
    ///
    /// For multi-part names the qualifiers shift: `t.cf.col` passes `t` as
    /// `schema` and `cf` as `table`, and the resolver decides which reading
    /// applies.
    fn resolve_column(
        &self,
        schema: Option<&str>,
        table: Option<&str>,
        column: &str,
    ) -> Result<ColumnRef>;

    fn resolve(&self, name: &ColumnName) -> Result<ColumnRef> {
        self.resolve_column(name.schema.as_deref(), name.table.as_deref(), &name.column)
    }
}

/// The resolver a statement gets
#[derive(Debug)]
pub enum Resolver {
    /// No table context yet, as for DDL
    Empty,
    Single(SingleTableResolver),
    Multi(MultiTableResolver),
}

impl ColumnResolver for Resolver {
    fn tables(&self) -> &[Arc<TableRef>] {
        match self {
            Resolver::Empty => &[],
            Resolver::Single(r) => r.tables(),
            Resolver::Multi(r) => r.tables(),
        }
    }

    fn resolve_column(
        &self,
        schema: Option<&str>,
        table: Option<&str>,
        column: &str,
    ) -> Result<ColumnRef> {
        match self {
            Resolver::Empty => Err(ResolveError::UnsupportedOperation {
                operation: "resolve column".to_string(),
            }),
            Resolver::Single(r) => r.resolve_column(schema, table, column),
            Resolver::Multi(r) => r.resolve_column(schema, table, column),
        }
    }
}

/// Build the resolver for `statement`
pub fn resolver_for(statement: &Statement, session: &Session) -> Result<Resolver> {
    resolver_with_dynamic_columns(statement, session, &[])
}

/// Build the resolver for `statement`, overlaying `columns` on its table
///
/// The extra columns are merged after the ones declared on the table node.
/// A query takes them only when its FROM clause is one named table. DDL has
/// no table to take them.
pub fn resolver_with_dynamic_columns(
    statement: &Statement,
    session: &Session,
    columns: &[ColumnDef],
) -> Result<Resolver> {
    match statement {
        Statement::CreateTable { .. } | Statement::CreateIndex { .. } => Ok(Resolver::Empty),
        Statement::Select { from } => {
            if from.len() > 1 {
                return Err(ResolveError::not_supported("Joins"));
            }
            let mut resolver = MultiTableResolver::new();
            if columns.is_empty() {
                for node in from {
                    resolver.visit(session, node)?;
                }
                return Ok(Resolver::Multi(resolver));
            }

            let [TableNode::Named(named)] = from.as_slice() else {
                return Err(ResolveError::not_supported(
                    "Dynamic columns without a single named table",
                ));
            };
            let declared: Vec<ColumnDef> = named.dynamic_columns.iter().chain(columns).cloned().collect();
            let node = named.clone().with_dynamic_columns(declared);
            resolver.visit(session, &TableNode::Named(node))?;
            Ok(Resolver::Multi(resolver))
        }
        Statement::Mutation { table, .. } => Ok(Resolver::Single(SingleTableResolver::new(
            session, table, columns,
        )?)),
    }
}
