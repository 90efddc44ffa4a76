//! Table lookup against a possibly stale metadata cache

use std::sync::Arc;

use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::metadata::MetadataProvider;
use crate::schema::{Schema, Table, TableName, UNSET_TIMESTAMP};
use crate::session::Session;

/// A table found in the cache together with the timestamp it is anchored to
#[derive(Debug)]
pub(crate) struct ResolvedTable {
    pub(crate) schema: Arc<Schema>,
    pub(crate) table: Arc<Table>,
    pub(crate) timestamp: i64,
}

/// Resolve a table, refreshing the cache at most once when it may be stale
///
/// Auto-commit sessions refresh before the lookup and take the refresh token
/// as the snapshot timestamp. Other sessions look up first and, on a miss,
/// refresh once; only a refresh that reports a change earns a second lookup.
pub(crate) fn resolve_table(session: &Session, name: &TableName) -> Result<ResolvedTable> {
    let provider = session.provider();
    let mut timestamp = UNSET_TIMESTAMP;

    if session.auto_commit() {
        timestamp = provider.refresh(&name.schema, &name.table)?.saturating_abs();
    }

    let found = match lookup(provider, name) {
        Ok(found) => found,
        Err(err @ ResolveError::TableNotFound { .. }) if !session.auto_commit() => {
            let token = provider.refresh(&name.schema, &name.table)?;
            if token < 0 {
                return Err(err);
            }
            debug!(table = %name, token, "table missing from cache, retrying after refresh");
            timestamp = token;
            lookup(provider, name)?
        }
        Err(err) => return Err(err),
    };

    debug!(table = %name, timestamp, "resolved table");
    Ok(ResolvedTable {
        schema: found.0,
        table: found.1,
        timestamp,
    })
}

fn lookup(provider: &dyn MetadataProvider, name: &TableName) -> Result<(Arc<Schema>, Arc<Table>)> {
    let schema = provider.schema(&name.schema).map_err(|e| match e {
        ResolveError::SchemaNotFound { .. } => {
            ResolveError::table_not_found(name.schema(), &name.table)
        }
        other => other,
    })?;
    let table = schema.table(&name.table)?.clone();
    Ok((schema, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::InMemoryProvider;
    use crate::schema::{ColumnSpec, TableBuilder};
    use crate::types::DataType;

    fn table(name: &str) -> Table {
        TableBuilder::new("", name)
            .column(ColumnSpec::in_default_family("id", DataType::Long))
            .build()
            .unwrap()
    }

    #[test]
    fn test_auto_commit_sees_unsynced_table() {
        let provider = Arc::new(InMemoryProvider::new());
        let published = provider.publish(table("t"));
        let session = Session::new(provider);

        let resolved = resolve_table(&session, &TableName::new("t")).unwrap();
        assert_eq!(resolved.timestamp, published);
        assert_eq!(resolved.table.name().table, "t");
    }

    #[test]
    fn test_auto_commit_uses_magnitude_of_unchanged_token() {
        let provider = Arc::new(InMemoryProvider::from_tables([table("t")]));
        let session = Session::new(provider.clone());

        let token = provider.refresh("", "t").unwrap();
        assert!(token < 0);
        let resolved = resolve_table(&session, &TableName::new("t")).unwrap();
        assert_eq!(resolved.timestamp, -token);
    }

    #[test]
    fn test_transaction_retries_once_after_change() {
        let provider = Arc::new(InMemoryProvider::new());
        let published = provider.publish(table("t"));
        let session = Session::new(provider).with_auto_commit(false);

        let resolved = resolve_table(&session, &TableName::new("t")).unwrap();
        assert_eq!(resolved.timestamp, published);
    }

    #[test]
    fn test_transaction_without_miss_keeps_unset_timestamp() {
        let provider = Arc::new(InMemoryProvider::from_tables([table("t")]));
        let session = Session::new(provider).with_auto_commit(false);

        let resolved = resolve_table(&session, &TableName::new("t")).unwrap();
        assert_eq!(resolved.timestamp, UNSET_TIMESTAMP);
    }

    #[test]
    fn test_missing_schema_surfaces_as_table_not_found() {
        let provider = Arc::new(InMemoryProvider::new());
        let session = Session::new(provider).with_auto_commit(false);

        let err = resolve_table(&session, &TableName::with_schema("s", "t")).unwrap_err();
        assert_eq!(err, ResolveError::table_not_found(Some("s"), "t"));
    }
}
