//! Resolved table and column references

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::schema::{Column, Schema, Table};

/// A resolved FROM-clause entry or mutation target
#[derive(Debug)]
pub struct TableRef {
    alias: Option<String>,
    table: Arc<Table>,
    schema: Arc<Schema>,
    timestamp: i64,
}

impl TableRef {
    pub fn new(
        alias: Option<String>,
        table: Arc<Table>,
        schema: Arc<Schema>,
        timestamp: i64,
    ) -> Self {
        Self {
            alias,
            table,
            schema,
            timestamp,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Metadata timestamp this reference is anchored to
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// A column inside a specific [`TableRef`]
///
/// Two column refs are equal when they point at the same table ref instance
/// and the same position, so `alias.col` and `table.col` of one FROM entry
/// compare equal while the same column of two entries does not.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    table_ref: Arc<TableRef>,
    position: usize,
}

impl ColumnRef {
    pub fn new(table_ref: Arc<TableRef>, position: usize) -> Self {
        Self {
            table_ref,
            position,
        }
    }

    pub fn table_ref(&self) -> &Arc<TableRef> {
        &self.table_ref
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn column(&self) -> &Column {
        &self.table_ref.table.columns()[self.position]
    }
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.table_ref, &other.table_ref) && self.position == other.position
    }
}

impl Eq for ColumnRef {}

impl Hash for ColumnRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.table_ref).hash(state);
        self.position.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSpec, TableBuilder};
    use crate::types::DataType;

    fn table_ref(alias: Option<&str>) -> Arc<TableRef> {
        let table = TableBuilder::new("", "t")
            .column(ColumnSpec::in_default_family("id", DataType::Long))
            .column(ColumnSpec::in_default_family("name", DataType::Varchar))
            .build()
            .unwrap();
        Arc::new(TableRef::new(
            alias.map(str::to_string),
            Arc::new(table),
            Arc::new(Schema::new("")),
            7,
        ))
    }

    #[test]
    fn test_equality_is_by_table_ref_identity() {
        let first = table_ref(None);
        let second = table_ref(None);

        assert_eq!(ColumnRef::new(first.clone(), 1), ColumnRef::new(first.clone(), 1));
        assert_ne!(ColumnRef::new(first.clone(), 0), ColumnRef::new(first.clone(), 1));
        assert_ne!(ColumnRef::new(first, 1), ColumnRef::new(second, 1));
    }

    #[test]
    fn test_column_accessor() {
        let column_ref = ColumnRef::new(table_ref(Some("x")), 1);
        assert_eq!(column_ref.column().name, "name");
        assert_eq!(column_ref.table_ref().alias(), Some("x"));
        assert_eq!(column_ref.table_ref().timestamp(), 7);
    }
}
