//! Resolver for the target table of a mutation

use std::sync::Arc;

use tracing::trace;

use crate::ast::{ColumnDef, NamedTableNode};
use crate::error::Result;
use crate::resolver::dynamic::add_dynamic_columns;
use crate::resolver::refs::{ColumnRef, TableRef};
use crate::resolver::staleness::resolve_table;
use crate::resolver::ColumnResolver;
use crate::session::Session;

/// Resolves columns against exactly one table with no alias
#[derive(Debug)]
pub struct SingleTableResolver {
    tables: Vec<Arc<TableRef>>,
}

impl SingleTableResolver {
    /// Resolve `node` and merge its dynamic columns followed by `extra_columns`
    pub fn new(session: &Session, node: &NamedTableNode, extra_columns: &[ColumnDef]) -> Result<Self> {
        let resolved = resolve_table(session, &node.name)?;

        let declared: Vec<ColumnDef> = node
            .dynamic_columns
            .iter()
            .chain(extra_columns)
            .cloned()
            .collect();
        let table = add_dynamic_columns(&resolved.table, &declared)?;

        let table_ref = TableRef::new(None, table, resolved.schema, resolved.timestamp);
        Ok(Self {
            tables: vec![Arc::new(table_ref)],
        })
    }

    fn table_ref(&self) -> &Arc<TableRef> {
        &self.tables[0]
    }
}

impl ColumnResolver for SingleTableResolver {
    fn tables(&self) -> &[Arc<TableRef>] {
        &self.tables
    }

    /// The schema qualifier is ignored; a table qualifier names a column family
    fn resolve_column(
        &self,
        _schema: Option<&str>,
        family: Option<&str>,
        column: &str,
    ) -> Result<ColumnRef> {
        let table_ref = self.table_ref();
        let table = table_ref.table();
        let found = match family.filter(|f| !f.is_empty()) {
            Some(family) => table.column_family(family)?.column(column)?,
            None => table.column(column)?,
        };
        trace!(table = %table.name(), column, position = found.position, "resolved column");
        Ok(ColumnRef::new(table_ref.clone(), found.position))
    }
}
