//! In-memory metadata provider with a separate client-side cache

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{ResolveError, Result};
use crate::metadata::MetadataProvider;
use crate::schema::{Schema, Table};

/// Metadata provider keeping an authoritative store and a lagging cache
///
/// Writers change the authoritative store only; readers see the cache until
/// a table is refreshed, which is how a concurrent schema change looks to a
/// client that has not yet picked it up.
#[derive(Debug)]
pub struct InMemoryProvider {
    state: RwLock<State>,
}

#[derive(Debug)]
struct State {
    /// Monotonic metadata clock, always at least 1
    clock: i64,
    store: IndexMap<String, IndexMap<String, Arc<Table>>>,
    cache: IndexMap<String, Arc<Schema>>,
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                clock: 1,
                store: IndexMap::new(),
                cache: IndexMap::new(),
            }),
        }
    }

    /// Provider whose cache already reflects every given table
    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let provider = Self::new();
        for table in tables {
            provider.publish(table);
        }
        provider.sync_all();
        provider
    }

    /// Create or replace a table in the authoritative store, returning its new timestamp
    pub fn publish(&self, table: Table) -> i64 {
        let mut state = self.state.write();
        state.clock += 1;
        let timestamp = state.clock;
        let table = table.with_timestamp(timestamp);
        let schema = table.name().schema.clone();
        let name = table.name().table.clone();
        state
            .store
            .entry(schema)
            .or_default()
            .insert(name, Arc::new(table));
        timestamp
    }

    /// Create an empty schema in the authoritative store
    pub fn create_schema(&self, name: &str) {
        let mut state = self.state.write();
        state.clock += 1;
        state.store.entry(name.to_string()).or_default();
    }

    /// Remove a table from the authoritative store
    pub fn drop_table(&self, schema: &str, table: &str) -> bool {
        let mut state = self.state.write();
        let removed = state
            .store
            .get_mut(schema)
            .and_then(|tables| tables.shift_remove(table))
            .is_some();
        if removed {
            state.clock += 1;
        }
        removed
    }

    /// Copy the whole authoritative store into the cache
    pub fn sync_all(&self) {
        let mut state = self.state.write();
        let cache = state
            .store
            .iter()
            .map(|(name, tables)| {
                let mut schema = Schema::new(name.clone());
                for table in tables.values() {
                    schema.insert(table.clone());
                }
                (name.clone(), Arc::new(schema))
            })
            .collect();
        state.cache = cache;
    }

    /// Snapshot of every cached schema
    pub fn cached_schemas(&self) -> Vec<Arc<Schema>> {
        self.state.read().cache.values().cloned().collect()
    }
}

impl MetadataProvider for InMemoryProvider {
    fn refresh(&self, schema: &str, table: &str) -> Result<i64> {
        let mut state = self.state.write();

        let schema_in_store = state.store.contains_key(schema);
        let authoritative = state
            .store
            .get(schema)
            .and_then(|tables| tables.get(table))
            .cloned();
        let cached_schema = state.cache.get(schema).cloned();
        let cached = cached_schema
            .as_ref()
            .and_then(|s| s.table(table).ok())
            .cloned();

        let unchanged = match (&authoritative, &cached) {
            (Some(a), Some(c)) => a.timestamp() == c.timestamp(),
            (None, None) => schema_in_store == cached_schema.is_some(),
            _ => false,
        };
        if unchanged {
            return Ok(-state.clock);
        }

        let mut updated = cached_schema
            .map(|s| (*s).clone())
            .unwrap_or_else(|| Schema::new(schema));
        let timestamp = match authoritative {
            Some(table) => {
                let timestamp = table.timestamp();
                updated.insert(table);
                timestamp
            }
            None => {
                updated.remove(table);
                state.clock
            }
        };

        if schema_in_store || !updated.is_empty() {
            state.cache.insert(schema.to_string(), Arc::new(updated));
        } else {
            state.cache.shift_remove(schema);
        }
        tracing::debug!(schema, table, timestamp, "refreshed cached table metadata");
        Ok(timestamp)
    }

    fn schema(&self, name: &str) -> Result<Arc<Schema>> {
        self.state
            .read()
            .cache
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::SchemaNotFound {
                schema: name.to_string(),
            })
    }
}
