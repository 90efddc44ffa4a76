//! Metadata model - schemas, tables, column families and columns

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};
use crate::types::{DataType, SortOrder};

/// Name of the family that holds columns declared without one
pub const DEFAULT_COLUMN_FAMILY: &str = "_0";

/// Snapshot timestamp of a table ref that was never anchored by a refresh
pub const UNSET_TIMESTAMP: i64 = i64::MAX;

/// A database schema (namespace) at one metadata version
#[derive(Debug, Clone, Default)]
pub struct Schema {
    name: String,
    tables: IndexMap<String, Arc<Table>>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<&Arc<Table>> {
        self.tables
            .get(name)
            .ok_or_else(|| ResolveError::table_not_found(Some(&self.name), name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub(crate) fn insert(&mut self, table: Arc<Table>) {
        self.tables.insert(table.name.table.clone(), table);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Arc<Table>> {
        self.tables.shift_remove(name)
    }
}

/// Qualified name (schema.table); the default schema is the empty string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            table: table.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Schema name, or `None` for the default schema
    pub fn schema(&self) -> Option<&str> {
        Some(self.schema.as_str()).filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.schema.is_empty() {
            write!(f, "{}", self.table)
        } else {
            write!(f, "{}.{}", self.schema, self.table)
        }
    }
}

/// Kind of a stored table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    System,
    #[default]
    User,
    View,
    Index,
}

/// Table definition
///
/// Column positions are contiguous from 0 and every column belongs to exactly
/// one declared family. Instances are only built through [`crate::schema::TableBuilder`]
/// or as structural copies of another table.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    name: TableName,
    kind: TableKind,
    timestamp: i64,
    sequence_number: i64,
    pk_name: Option<String>,
    bucket_count: Option<u32>,
    columns: Vec<Column>,
    families: IndexMap<String, ColumnFamily>,
}

/// Fixed attributes of a table that survive a structural copy
#[derive(Debug, Clone)]
pub(crate) struct TableHeader {
    pub(crate) name: TableName,
    pub(crate) kind: TableKind,
    pub(crate) timestamp: i64,
    pub(crate) sequence_number: i64,
    pub(crate) pk_name: Option<String>,
    pub(crate) bucket_count: Option<u32>,
}

impl Table {
    /// Assemble a table from columns already carrying their final positions
    pub(crate) fn from_parts(
        header: TableHeader,
        family_names: impl IntoIterator<Item = String>,
        columns: Vec<Column>,
    ) -> Result<Self> {
        let mut families: IndexMap<String, ColumnFamily> = family_names
            .into_iter()
            .map(|name| (name.clone(), ColumnFamily::new(name)))
            .collect();

        for (expected, column) in columns.iter().enumerate() {
            if column.position != expected {
                return Err(ResolveError::invalid(format!(
                    "column '{}' of table '{}' is at position {} but {} was expected",
                    column.name, header.name, column.position, expected
                )));
            }
            let family = families.get_mut(&column.family).ok_or_else(|| {
                ResolveError::invalid(format!(
                    "column '{}' of table '{}' names undeclared family '{}'",
                    column.name, header.name, column.family
                ))
            })?;
            if family.columns.contains_key(&column.name) {
                return Err(ResolveError::invalid(format!(
                    "duplicate column '{}.{}' in table '{}'",
                    column.family, column.name, header.name
                )));
            }
            family.columns.insert(column.name.clone(), column.clone());
        }

        Ok(Self {
            name: header.name,
            kind: header.kind,
            timestamp: header.timestamp,
            sequence_number: header.sequence_number,
            pk_name: header.pk_name,
            bucket_count: header.bucket_count,
            columns,
            families,
        })
    }

    pub(crate) fn header(&self) -> TableHeader {
        TableHeader {
            name: self.name.clone(),
            kind: self.kind,
            timestamp: self.timestamp,
            sequence_number: self.sequence_number,
            pk_name: self.pk_name.clone(),
            bucket_count: self.bucket_count,
        }
    }

    /// Structural copy with a replaced column sequence
    pub(crate) fn with_columns(&self, columns: Vec<Column>) -> Result<Self> {
        Self::from_parts(self.header(), self.families.keys().cloned(), columns)
    }

    pub(crate) fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    pub fn pk_name(&self) -> Option<&str> {
        self.pk_name.as_deref()
    }

    pub fn bucket_count(&self) -> Option<u32> {
        self.bucket_count
    }

    /// Columns in position order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name across all families
    ///
    /// A name is only unique within its family, so the same name in two
    /// families is reported as ambiguous.
    pub fn column(&self, name: &str) -> Result<&Column> {
        let mut matches = self.columns.iter().filter(|c| c.name == name);
        match (matches.next(), matches.next()) {
            (Some(column), None) => Ok(column),
            (Some(_), Some(_)) => Err(ResolveError::ambiguous_column(name)),
            (None, _) => Err(ResolveError::column_not_found(name)),
        }
    }

    pub fn column_family(&self, name: &str) -> Result<&ColumnFamily> {
        self.families
            .get(name)
            .ok_or_else(|| ResolveError::family_not_found(name))
    }

    pub fn column_families(&self) -> impl Iterator<Item = &ColumnFamily> {
        self.families.values()
    }
}

/// Named group of columns within a table
#[derive(Debug, Clone, Serialize)]
pub struct ColumnFamily {
    name: String,
    columns: IndexMap<String, Column>,
}

impl ColumnFamily {
    fn new(name: String) -> Self {
        Self {
            name,
            columns: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| ResolveError::column_not_found(name))
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub family: String,
    pub data_type: DataType,
    pub max_length: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
    pub position: usize,
    pub sort_order: SortOrder,
}
