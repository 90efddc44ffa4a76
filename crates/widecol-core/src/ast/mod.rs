//! Statement and FROM-clause nodes consumed by the resolver

mod convert;

use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::error::{ResolveError, Result};
use crate::schema::{TableName, DEFAULT_COLUMN_FAMILY};
use crate::types::{DataType, SortOrder};

pub use convert::{column_references, lower_statement};

/// A statement as far as name resolution is concerned
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable { name: TableName },
    CreateIndex { table: TableName },
    Select { from: Vec<TableNode> },
    Mutation { kind: MutationKind, table: NamedTableNode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

/// One entry of a FROM clause
#[derive(Debug, Clone, PartialEq)]
pub enum TableNode {
    Named(NamedTableNode),
    Join(JoinTableNode),
    Bind(BindTableNode),
    Derived(DerivedTableNode),
}

/// A table referenced by name, optionally aliased and carrying dynamic columns
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTableNode {
    pub name: TableName,
    pub alias: Option<String>,
    pub dynamic_columns: Vec<ColumnDef>,
}

impl NamedTableNode {
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            alias: None,
            dynamic_columns: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_dynamic_columns(mut self, columns: Vec<ColumnDef>) -> Self {
        self.dynamic_columns = columns;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinTableNode {
    pub kind: JoinKind,
    pub left: Box<TableNode>,
    pub right: Box<TableNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Other,
}

/// A table supplied through a bind parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindTableNode {
    pub index: usize,
}

/// A subquery in the FROM clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTableNode {
    pub alias: Option<String>,
}

/// Column declared at query time on top of a stored table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub family: Option<String>,
    pub name: String,
    pub data_type: DataType,
    pub max_length: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
    pub sort_order: SortOrder,
}

impl ColumnDef {
    pub fn new(family: Option<&str>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            family: family.map(str::to_string),
            name: name.into(),
            data_type,
            max_length: None,
            scale: None,
            nullable: true,
            sort_order: SortOrder::Asc,
        }
    }

    /// Family the column lands in when merged
    pub fn family_or_default(&self) -> &str {
        self.family.as_deref().unwrap_or(DEFAULT_COLUMN_FAMILY)
    }

    /// Parse a declaration such as `CF.COL VARCHAR(10) NOT NULL`
    pub fn parse(declaration: &str) -> Result<Self> {
        let declaration = declaration.trim();
        let (name_part, type_part) = declaration
            .split_once(char::is_whitespace)
            .ok_or_else(|| {
                ResolveError::parse(format!("missing type in column '{}'", declaration))
            })?;

        let (family, name) = match name_part.split_once('.') {
            Some((family, name)) => (Some(family), name),
            None => (None, name_part),
        };
        if name.is_empty() || family.is_some_and(str::is_empty) {
            return Err(ResolveError::parse(format!(
                "invalid column name '{}'",
                name_part
            )));
        }

        let dialect = GenericDialect {};
        let mut parser = Parser::new(&dialect)
            .try_with_sql(type_part)
            .map_err(|e| ResolveError::parse(e.to_string()))?;
        let ast_type = parser
            .parse_data_type()
            .map_err(|e| ResolveError::parse(e.to_string()))?;
        let declared = DataType::from_ast(&ast_type).ok_or_else(|| {
            ResolveError::parse(format!("unsupported column type '{}'", ast_type))
        })?;

        let nullable = if parser.parse_keywords(&[Keyword::NOT, Keyword::NULL]) {
            false
        } else {
            let _ = parser.parse_keyword(Keyword::NULL);
            true
        };
        let sort_order = if parser.parse_keyword(Keyword::DESC) {
            SortOrder::Desc
        } else {
            let _ = parser.parse_keyword(Keyword::ASC);
            SortOrder::Asc
        };
        if parser.peek_token().token != Token::EOF {
            return Err(ResolveError::parse(format!(
                "unexpected '{}' in column '{}'",
                parser.peek_token().token,
                declaration
            )));
        }

        Ok(Self {
            family: family.map(str::to_string),
            name: name.to_string(),
            data_type: declared.data_type,
            max_length: declared.max_length,
            scale: declared.scale,
            nullable,
            sort_order,
        })
    }
}

/// A possibly qualified column reference: `column`, `qualifier.column` or
/// `schema.qualifier.column`, where the qualifier is a table, alias or family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: String,
}

impl ColumnName {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Build from identifier parts, `None` for more than three parts
    pub fn from_parts(parts: &[&str]) -> Option<Self> {
        match parts {
            [column] => Some(Self::new(*column)),
            [table, column] => Some(Self::qualified(*table, *column)),
            [schema, table, column] => Some(Self {
                schema: Some(schema.to_string()),
                table: Some(table.to_string()),
                column: column.to_string(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        if let Some(table) = &self.table {
            write!(f, "{}.", table)?;
        }
        write!(f, "{}", self.column)
    }
}
