//! Table builder - assembles validated table definitions

use serde::Deserialize;

use crate::error::{ResolveError, Result};
use crate::schema::catalog::{Column, Table, TableHeader, TableKind, TableName, DEFAULT_COLUMN_FAMILY};
use crate::types::{DataType, SortOrder};

/// Builder for constructing a [`Table`]
///
/// Positions are assigned in declaration order. Families are declared
/// explicitly with [`TableBuilder::family`] or implicitly by the first column
/// that names them. Deserializes from the metadata file format used by the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableBuilder {
    #[serde(default)]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    #[serde(default)]
    pub sequence_number: i64,
    #[serde(default)]
    pub pk_name: Option<String>,
    #[serde(default)]
    pub bucket_count: Option<u32>,
    #[serde(default)]
    pub families: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl TableBuilder {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: TableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn sequence_number(mut self, sequence_number: i64) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn pk_name(mut self, pk_name: impl Into<String>) -> Self {
        self.pk_name = Some(pk_name.into());
        self
    }

    pub fn bucket_count(mut self, bucket_count: u32) -> Self {
        self.bucket_count = Some(bucket_count);
        self
    }

    /// Declare a column family, which may stay empty
    pub fn family(mut self, name: impl Into<String>) -> Self {
        self.families.push(name.into());
        self
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> Result<Table> {
        if self.name.is_empty() {
            return Err(ResolveError::invalid("table name must not be empty"));
        }
        let name = TableName::with_schema(self.schema, self.name);

        let mut family_names: Vec<String> = Vec::new();
        for family in self
            .families
            .into_iter()
            .chain(self.columns.iter().map(|c| c.family.clone()))
        {
            if family.is_empty() {
                return Err(ResolveError::invalid(format!(
                    "empty column family name in table '{}'",
                    name
                )));
            }
            if !family_names.contains(&family) {
                family_names.push(family);
            }
        }

        let mut columns = Vec::with_capacity(self.columns.len());
        for (position, spec) in self.columns.into_iter().enumerate() {
            if spec.name.is_empty() {
                return Err(ResolveError::invalid(format!(
                    "empty column name at position {} in table '{}'",
                    position, name
                )));
            }
            columns.push(spec.into_column(position));
        }

        let header = TableHeader {
            name,
            kind: self.kind,
            timestamp: 0,
            sequence_number: self.sequence_number,
            pk_name: self.pk_name,
            bucket_count: self.bucket_count,
        };
        Table::from_parts(header, family_names, columns)
    }
}

/// Column declaration inside a [`TableBuilder`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_family() -> String {
    DEFAULT_COLUMN_FAMILY.to_string()
}

fn default_nullable() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(family: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            family: family.into(),
            data_type,
            max_length: None,
            scale: None,
            nullable: true,
            sort_order: SortOrder::Asc,
        }
    }

    /// Column in the default family
    pub fn in_default_family(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(DEFAULT_COLUMN_FAMILY, name, data_type)
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn descending(mut self) -> Self {
        self.sort_order = SortOrder::Desc;
        self
    }

    fn into_column(self, position: usize) -> Column {
        Column {
            name: self.name,
            family: self.family,
            data_type: self.data_type,
            max_length: self.max_length,
            scale: self.scale,
            nullable: self.nullable,
            position,
            sort_order: self.sort_order,
        }
    }
}
