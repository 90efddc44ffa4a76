//! Error types for name resolution

use serde::{Deserialize, Serialize};

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

/// Failure raised while building a resolver or resolving a column reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ResolveError {
    #[error("Schema '{schema}' not found")]
    #[diagnostic(code(widecol::schema_not_found))]
    SchemaNotFound { schema: String },

    #[error("Table '{name}' not found")]
    #[diagnostic(
        code(widecol::table_not_found),
        help("Check that the table exists and that its schema is visible to this session")
    )]
    TableNotFound { name: String },

    #[error("Column '{column}' not found")]
    #[diagnostic(code(widecol::column_not_found))]
    ColumnNotFound { column: String },

    #[error("Column family '{family}' not found")]
    #[diagnostic(code(widecol::column_family_not_found))]
    ColumnFamilyNotFound { family: String },

    #[error("Table reference '{table}' is ambiguous")]
    #[diagnostic(
        code(widecol::ambiguous_table),
        help("Give each table in the FROM clause a distinct alias")
    )]
    AmbiguousTable { table: String },

    #[error("Column reference '{column}' is ambiguous")]
    #[diagnostic(
        code(widecol::ambiguous_column),
        help("Qualify the column with a table, alias or column family name")
    )]
    AmbiguousColumn { column: String },

    #[error("{feature} not supported")]
    #[diagnostic(code(widecol::feature_not_supported))]
    FeatureNotSupported { feature: String },

    #[error("Cannot {operation} without a table context")]
    #[diagnostic(code(widecol::unsupported_operation))]
    UnsupportedOperation { operation: String },

    #[error("Invalid table definition: {message}")]
    #[diagnostic(code(widecol::invalid_definition))]
    InvalidDefinition { message: String },

    #[error("Parse error: {message}")]
    #[diagnostic(code(widecol::parse_error))]
    Parse { message: String },
}

impl ResolveError {
    /// Table-not-found for an optionally schema-qualified table name
    pub fn table_not_found(schema: Option<&str>, table: &str) -> Self {
        let name = match schema {
            Some(schema) if !schema.is_empty() => format!("{}.{}", schema, table),
            _ => table.to_string(),
        };
        ResolveError::TableNotFound { name }
    }

    pub fn column_not_found(column: impl Into<String>) -> Self {
        ResolveError::ColumnNotFound {
            column: column.into(),
        }
    }

    pub fn family_not_found(family: impl Into<String>) -> Self {
        ResolveError::ColumnFamilyNotFound {
            family: family.into(),
        }
    }

    pub fn ambiguous_column(column: impl Into<String>) -> Self {
        ResolveError::AmbiguousColumn {
            column: column.into(),
        }
    }

    pub fn not_supported(feature: impl Into<String>) -> Self {
        ResolveError::FeatureNotSupported {
            feature: feature.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ResolveError::InvalidDefinition {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        ResolveError::Parse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::SchemaNotFound { .. } => ErrorKind::SchemaNotFound,
            ResolveError::TableNotFound { .. } => ErrorKind::TableNotFound,
            ResolveError::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            ResolveError::ColumnFamilyNotFound { .. } => ErrorKind::ColumnFamilyNotFound,
            ResolveError::AmbiguousTable { .. } => ErrorKind::AmbiguousTable,
            ResolveError::AmbiguousColumn { .. } => ErrorKind::AmbiguousColumn,
            ResolveError::FeatureNotSupported { .. } => ErrorKind::FeatureNotSupported,
            ResolveError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            ResolveError::InvalidDefinition { .. } => ErrorKind::InvalidDefinition,
            ResolveError::Parse { .. } => ErrorKind::ParseError,
        }
    }

    /// Get the error code string (e.g., "E0001")
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// Kinds of resolution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// E0001: Table not found
    TableNotFound,
    /// E0002: Column not found
    ColumnNotFound,
    /// E0003: Column family not found
    ColumnFamilyNotFound,
    /// E0004: Schema not found
    SchemaNotFound,
    /// E0005: Ambiguous table reference
    AmbiguousTable,
    /// E0006: Ambiguous column reference
    AmbiguousColumn,
    /// E0007: Feature not supported
    FeatureNotSupported,
    /// E0008: Resolution without table context
    UnsupportedOperation,
    /// E0009: Malformed table definition
    InvalidDefinition,
    /// Parse error
    ParseError,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TableNotFound => "E0001",
            ErrorKind::ColumnNotFound => "E0002",
            ErrorKind::ColumnFamilyNotFound => "E0003",
            ErrorKind::SchemaNotFound => "E0004",
            ErrorKind::AmbiguousTable => "E0005",
            ErrorKind::AmbiguousColumn => "E0006",
            ErrorKind::FeatureNotSupported => "E0007",
            ErrorKind::UnsupportedOperation => "E0008",
            ErrorKind::InvalidDefinition => "E0009",
            ErrorKind::ParseError => "E1000",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::TableNotFound => "table-not-found",
            ErrorKind::ColumnNotFound => "column-not-found",
            ErrorKind::ColumnFamilyNotFound => "column-family-not-found",
            ErrorKind::SchemaNotFound => "schema-not-found",
            ErrorKind::AmbiguousTable => "ambiguous-table",
            ErrorKind::AmbiguousColumn => "ambiguous-column",
            ErrorKind::FeatureNotSupported => "feature-not-supported",
            ErrorKind::UnsupportedOperation => "unsupported-operation",
            ErrorKind::InvalidDefinition => "invalid-definition",
            ErrorKind::ParseError => "parse-error",
        }
    }
}
