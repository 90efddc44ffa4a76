//! Overlay of query-time column declarations onto a stored table

use std::sync::Arc;

use tracing::debug;

use crate::ast::ColumnDef;
use crate::error::{ResolveError, Result};
use crate::schema::{Column, Table};

/// Merge dynamic column declarations into a copy of `table`
///
/// A declaration naming an existing column must repeat its type exactly,
/// otherwise it conflicts. New columns must land in a family the table
/// already has and are appended after the last position. The stored table is
/// never modified.
pub(crate) fn add_dynamic_columns(table: &Arc<Table>, declared: &[ColumnDef]) -> Result<Arc<Table>> {
    if declared.is_empty() {
        return Ok(table.clone());
    }

    let mut accepted: Vec<&ColumnDef> = Vec::new();
    for def in declared {
        let existing = match table.column(&def.name) {
            Ok(column) => Some(column.data_type),
            Err(ResolveError::ColumnNotFound { .. }) => accepted
                .iter()
                .find(|a| a.name == def.name)
                .map(|a| a.data_type),
            Err(e) => return Err(e),
        };

        match existing {
            Some(data_type) if data_type == def.data_type => {}
            Some(_) => return Err(ResolveError::ambiguous_column(&def.name)),
            None => {
                table.column_family(def.family_or_default())?;
                accepted.push(def);
            }
        }
    }

    if accepted.is_empty() {
        return Ok(table.clone());
    }

    let mut columns = table.columns().to_vec();
    for def in &accepted {
        columns.push(Column {
            name: def.name.clone(),
            family: def.family_or_default().to_string(),
            data_type: def.data_type,
            max_length: def.max_length,
            scale: def.scale,
            nullable: def.nullable,
            position: columns.len(),
            sort_order: def.sort_order,
        });
    }

    debug!(
        table = %table.name(),
        added = accepted.len(),
        "merged dynamic columns"
    );
    Ok(Arc::new(table.with_columns(columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSpec, TableBuilder, TableKind, DEFAULT_COLUMN_FAMILY};
    use crate::types::DataType;
    use pretty_assertions::assert_eq;

    fn events() -> Arc<Table> {
        Arc::new(
            TableBuilder::new("app", "events")
                .kind(TableKind::User)
                .sequence_number(4)
                .pk_name("pk_events")
                .bucket_count(8)
                .column(ColumnSpec::in_default_family("id", DataType::Long).not_null())
                .column(ColumnSpec::new("cf", "kind", DataType::Varchar))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_appends_new_columns_in_order() {
        let table = events();
        let merged = add_dynamic_columns(
            &table,
            &[
                ColumnDef::new(Some("cf"), "payload", DataType::Varbinary),
                ColumnDef::new(None, "seen", DataType::Boolean),
            ],
        )
        .unwrap();

        assert_eq!(merged.columns().len(), 4);
        let payload = merged.column_family("cf").unwrap().column("payload").unwrap();
        assert_eq!(payload.position, 2);
        let seen = merged.column("seen").unwrap();
        assert_eq!(seen.position, 3);
        assert_eq!(seen.family, DEFAULT_COLUMN_FAMILY);

        assert_eq!(table.columns().len(), 2, "stored table must stay untouched");
    }

    #[test]
    fn test_copy_preserves_table_attributes() {
        let table = events();
        let merged =
            add_dynamic_columns(&table, &[ColumnDef::new(Some("cf"), "x", DataType::Integer)])
                .unwrap();

        assert_eq!(merged.name(), table.name());
        assert_eq!(merged.kind(), table.kind());
        assert_eq!(merged.timestamp(), table.timestamp());
        assert_eq!(merged.sequence_number(), 4);
        assert_eq!(merged.pk_name(), Some("pk_events"));
        assert_eq!(merged.bucket_count(), Some(8));
    }

    #[test]
    fn test_identical_redeclaration_is_idempotent() {
        let table = events();
        let decl = [ColumnDef::new(Some("cf"), "payload", DataType::Varbinary)];

        let once = add_dynamic_columns(&table, &decl).unwrap();
        let twice = add_dynamic_columns(&once, &decl).unwrap();

        assert_eq!(once.columns(), twice.columns());
        assert!(Arc::ptr_eq(&once, &twice));

        let existing = [ColumnDef::new(Some("cf"), "kind", DataType::Varchar)];
        let same = add_dynamic_columns(&table, &existing).unwrap();
        assert_eq!(same.columns(), table.columns());
    }

    #[test]
    fn test_duplicate_within_one_declaration_list() {
        let table = events();
        let merged = add_dynamic_columns(
            &table,
            &[
                ColumnDef::new(Some("cf"), "payload", DataType::Varbinary),
                ColumnDef::new(Some("cf"), "payload", DataType::Varbinary),
            ],
        )
        .unwrap();
        assert_eq!(merged.columns().len(), 3);

        let err = add_dynamic_columns(
            &table,
            &[
                ColumnDef::new(Some("cf"), "payload", DataType::Varbinary),
                ColumnDef::new(Some("cf"), "payload", DataType::Integer),
            ],
        )
        .unwrap_err();
        assert_eq!(err, ResolveError::ambiguous_column("payload"));
    }

    #[test]
    fn test_type_conflict_is_rejected() {
        let err =
            add_dynamic_columns(&events(), &[ColumnDef::new(None, "kind", DataType::Integer)])
                .unwrap_err();
        assert_eq!(err, ResolveError::ambiguous_column("kind"));
    }

    #[test]
    fn test_missing_family_is_rejected() {
        let err = add_dynamic_columns(
            &events(),
            &[ColumnDef::new(Some("nope"), "x", DataType::Integer)],
        )
        .unwrap_err();
        assert_eq!(err, ResolveError::family_not_found("nope"));

        let no_default = Arc::new(
            TableBuilder::new("", "t")
                .column(ColumnSpec::new("cf", "a", DataType::Integer))
                .build()
                .unwrap(),
        );
        let err = add_dynamic_columns(&no_default, &[ColumnDef::new(None, "x", DataType::Integer)])
            .unwrap_err();
        assert_eq!(err, ResolveError::family_not_found(DEFAULT_COLUMN_FAMILY));
    }
}
