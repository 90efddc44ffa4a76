//! Output formatting

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use widecol_core::error::ErrorKind;
use widecol_core::schema::Schema;
use widecol_core::{ColumnName, ColumnRef, ResolveError, Table};

use crate::args::OutputFormat;

/// Outcome of resolving one column reference
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub reference: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Resolved {
        table: String,
        alias: Option<String>,
        family: String,
        position: usize,
        data_type: String,
        timestamp: i64,
    },
    Failed {
        error: ErrorReport,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ResolveError> for ErrorReport {
    fn from(err: &ResolveError) -> Self {
        Self {
            code: err.code(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl Resolution {
    pub fn new(reference: &ColumnName, result: &widecol_core::Result<ColumnRef>) -> Self {
        let outcome = match result {
            Ok(column_ref) => {
                let table_ref = column_ref.table_ref();
                let column = column_ref.column();
                Outcome::Resolved {
                    table: table_ref.table().name().to_string(),
                    alias: table_ref.alias().map(str::to_string),
                    family: column.family.clone(),
                    position: column_ref.position(),
                    data_type: column.data_type.to_string(),
                    timestamp: table_ref.timestamp(),
                }
            }
            Err(err) => Outcome::Failed { error: err.into() },
        };
        Self {
            reference: reference.to_string(),
            outcome,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

/// Output formatter for resolutions and metadata listings
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print one line per column reference
    pub fn print_resolutions(&self, sql: &str, resolutions: &[Resolution]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_human(resolutions);
                Ok(())
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "statement": sql,
                    "columns": resolutions,
                });
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
                Ok(())
            }
        }
    }

    /// Print a statement-level failure
    pub fn print_error(&self, sql: &str, err: &ResolveError) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                eprintln!("\x1b[31merror\x1b[0m[{}]: {}", err.code(), err);
                Ok(())
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "statement": sql,
                    "error": ErrorReport::from(err),
                });
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
                Ok(())
            }
        }
    }

    pub fn print_schemas(&self, schemas: &[std::sync::Arc<Schema>]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for schema in schemas {
                    let name = if schema.name().is_empty() {
                        "(default)"
                    } else {
                        schema.name()
                    };
                    println!("Schema: {}", name);
                    for table in schema.tables() {
                        print_table(table);
                    }
                }
                Ok(())
            }
            OutputFormat::Json => {
                let tables: Vec<&Table> = schemas
                    .iter()
                    .flat_map(|s| s.tables())
                    .map(|t| t.as_ref())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&tables).into_diagnostic()?);
                Ok(())
            }
        }
    }

    fn print_human(&self, resolutions: &[Resolution]) {
        let width = resolutions
            .iter()
            .map(|r| r.reference.len())
            .max()
            .unwrap_or(0);

        for resolution in resolutions {
            match &resolution.outcome {
                Outcome::Resolved {
                    table,
                    alias,
                    family,
                    position,
                    data_type,
                    ..
                } => {
                    let source = match alias {
                        Some(alias) => format!("{} AS {}", table, alias),
                        None => table.clone(),
                    };
                    println!(
                        "{:<width$}  {}  {}[{}]  {}",
                        resolution.reference,
                        source,
                        family,
                        position,
                        data_type,
                        width = width
                    );
                }
                Outcome::Failed { error } => {
                    eprintln!(
                        "{:<width$}  \x1b[31merror\x1b[0m[{}]: {}",
                        resolution.reference,
                        error.code,
                        error.message,
                        width = width
                    );
                }
            }
        }
    }
}

fn print_table(table: &Table) {
    println!("  Table: {} ({:?})", table.name().table, table.kind());
    for family in table.column_families() {
        println!("    Family: {}", family.name());
        for column in family.columns() {
            let nullable = if column.nullable { "NULL" } else { "NOT NULL" };
            println!(
                "      {:>3} {} {} {}",
                column.position,
                column.name,
                column.data_type.display_name(),
                nullable
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_resolution_serializes_error() {
        let err = ResolveError::column_not_found("nope");
        let resolution = Resolution::new(&ColumnName::new("nope"), &Err(err));
        assert!(resolution.is_error());

        let value = serde_json::to_value(&resolution).unwrap();
        assert_eq!(value["reference"], "nope");
        assert_eq!(value["error"]["code"], "E0002");
        assert_eq!(value["error"]["kind"], "ColumnNotFound");
    }
}
