//! Lowering of sqlparser statements into resolver nodes

use std::ops::ControlFlow;

use sqlparser::ast::{
    self as sql, AssignmentTarget, Expr, FromTable, JoinOperator, ObjectName, SetExpr, TableFactor,
    TableWithJoins,
};

use crate::ast::{
    ColumnName, DerivedTableNode, JoinKind, JoinTableNode, MutationKind, NamedTableNode, Statement,
    TableNode,
};
use crate::error::{ResolveError, Result};
use crate::schema::TableName;

/// Lower a parsed statement into the node set the resolver understands
///
/// Joins and subqueries in FROM are kept as their own nodes so the resolver
/// decides how to treat them; constructs with no node at all are rejected here.
pub fn lower_statement(stmt: &sql::Statement) -> Result<Statement> {
    reject_nested_queries(stmt)?;
    match stmt {
        sql::Statement::Query(query) => lower_query(query),
        sql::Statement::Insert(insert) => {
            if let Some(source) = &insert.source {
                if reads_tables(source) {
                    return Err(ResolveError::not_supported("INSERT from a query"));
                }
            }
            Ok(Statement::Mutation {
                kind: MutationKind::Insert,
                table: NamedTableNode::new(lower_object_name(&insert.table_name)?),
            })
        }
        sql::Statement::Update { table, .. } => Ok(Statement::Mutation {
            kind: MutationKind::Update,
            table: mutation_target(table, "UPDATE")?,
        }),
        sql::Statement::Delete(delete) => {
            let tables = match &delete.from {
                FromTable::WithFromKeyword(tables) => tables,
                FromTable::WithoutKeyword(tables) => tables,
            };
            match tables.as_slice() {
                [table] => Ok(Statement::Mutation {
                    kind: MutationKind::Delete,
                    table: mutation_target(table, "DELETE")?,
                }),
                _ => Err(ResolveError::not_supported("Multi-table DELETE")),
            }
        }
        sql::Statement::CreateTable(create) => Ok(Statement::CreateTable {
            name: lower_object_name(&create.name)?,
        }),
        sql::Statement::CreateIndex(create) => Ok(Statement::CreateIndex {
            table: lower_object_name(&create.table_name)?,
        }),
        other => Err(ResolveError::not_supported(format!(
            "Statement '{}'",
            statement_keyword(other)
        ))),
    }
}

/// Collect every column reference of a statement in source order
///
/// INSERT column lists and UPDATE assignment targets are included as
/// unqualified references. A name with more than three parts is a parse error.
pub fn column_references(stmt: &sql::Statement) -> Result<Vec<ColumnName>> {
    let mut references = Vec::new();

    match stmt {
        sql::Statement::Insert(insert) => {
            references.extend(insert.columns.iter().map(|c| ColumnName::new(&c.value)));
        }
        sql::Statement::Update { assignments, .. } => {
            for assignment in assignments {
                match &assignment.target {
                    AssignmentTarget::ColumnName(name) => {
                        references.push(column_name(&name.0)?);
                    }
                    AssignmentTarget::Tuple(names) => {
                        for name in names {
                            references.push(column_name(&name.0)?);
                        }
                    }
                }
            }
        }
        _ => {}
    }

    let flow = sql::visit_expressions(stmt, |expr| {
        match expr {
            Expr::Identifier(ident) => references.push(ColumnName::new(&ident.value)),
            Expr::CompoundIdentifier(idents) => match column_name(idents) {
                Ok(name) => references.push(name),
                Err(e) => return ControlFlow::Break(e),
            },
            _ => {}
        }
        ControlFlow::Continue(())
    });
    if let ControlFlow::Break(e) = flow {
        return Err(e);
    }

    Ok(references)
}

/// Subqueries outside FROM have no scope of their own here
fn reject_nested_queries(stmt: &sql::Statement) -> Result<()> {
    let flow = sql::visit_expressions(stmt, |expr| match expr {
        Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. } => {
            ControlFlow::Break(())
        }
        _ => ControlFlow::Continue(()),
    });
    match flow {
        ControlFlow::Break(()) => Err(ResolveError::not_supported("Subqueries")),
        ControlFlow::Continue(()) => Ok(()),
    }
}

/// Whether an INSERT source reads from tables rather than listing values
fn reads_tables(query: &sql::Query) -> bool {
    match query.body.as_ref() {
        SetExpr::Values(_) => false,
        SetExpr::Select(select) => !select.from.is_empty(),
        _ => true,
    }
}

fn lower_query(query: &sql::Query) -> Result<Statement> {
    if query.with.is_some() {
        return Err(ResolveError::not_supported("Common table expressions"));
    }
    match query.body.as_ref() {
        SetExpr::Select(select) => {
            let from = select
                .from
                .iter()
                .map(lower_table_with_joins)
                .collect::<Result<Vec<_>>>()?;
            Ok(Statement::Select { from })
        }
        SetExpr::Query(inner) => lower_query(inner),
        _ => Err(ResolveError::not_supported("Set operations")),
    }
}

fn mutation_target(table: &TableWithJoins, statement: &str) -> Result<NamedTableNode> {
    match lower_table_with_joins(table)? {
        TableNode::Named(node) => Ok(node),
        _ => Err(ResolveError::not_supported(format!(
            "{} against anything but a named table",
            statement
        ))),
    }
}

fn lower_table_with_joins(table: &TableWithJoins) -> Result<TableNode> {
    let mut node = lower_table_factor(&table.relation)?;
    for join in &table.joins {
        node = TableNode::Join(JoinTableNode {
            kind: join_kind(&join.join_operator),
            left: Box::new(node),
            right: Box::new(lower_table_factor(&join.relation)?),
        });
    }
    Ok(node)
}

fn lower_table_factor(factor: &TableFactor) -> Result<TableNode> {
    match factor {
        TableFactor::Table {
            name, alias, args, ..
        } => {
            if args.is_some() {
                return Err(ResolveError::not_supported("Table-valued functions"));
            }
            let mut node = NamedTableNode::new(lower_object_name(name)?);
            node.alias = alias.as_ref().map(|a| a.name.value.clone());
            Ok(TableNode::Named(node))
        }
        TableFactor::Derived { alias, .. } => Ok(TableNode::Derived(DerivedTableNode {
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        })),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => lower_table_with_joins(table_with_joins),
        _ => Err(ResolveError::not_supported("Table factor")),
    }
}

fn join_kind(operator: &JoinOperator) -> JoinKind {
    match operator {
        JoinOperator::Inner(_) => JoinKind::Inner,
        JoinOperator::LeftOuter(_) => JoinKind::Left,
        JoinOperator::RightOuter(_) => JoinKind::Right,
        JoinOperator::FullOuter(_) => JoinKind::Full,
        JoinOperator::CrossJoin => JoinKind::Cross,
        _ => JoinKind::Other,
    }
}

fn lower_object_name(name: &ObjectName) -> Result<TableName> {
    match name.0.as_slice() {
        [table] => Ok(TableName::new(&table.value)),
        [schema, table] => Ok(TableName::with_schema(&schema.value, &table.value)),
        _ => Err(ResolveError::parse(format!(
            "table name '{}' has too many parts",
            name
        ))),
    }
}

fn column_name(idents: &[sql::Ident]) -> Result<ColumnName> {
    let parts: Vec<&str> = idents.iter().map(|i| i.value.as_str()).collect();
    ColumnName::from_parts(&parts).ok_or_else(|| {
        ResolveError::parse(format!(
            "column name '{}' has too many parts",
            parts.join(".")
        ))
    })
}

fn statement_keyword(stmt: &sql::Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
