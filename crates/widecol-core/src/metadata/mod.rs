//! Metadata provider boundary
//!
//! The resolver never owns table metadata. It asks a provider for the
//! currently cached view of a schema and, when that view may be stale, asks
//! the provider to refresh one table from the authoritative store.

mod memory;

use std::sync::Arc;

use crate::error::Result;
use crate::schema::Schema;

pub use memory::InMemoryProvider;

/// Source of versioned schema and table definitions
///
/// Implementations are shared across sessions and threads and must serialize
/// their own concurrent refreshes. Every call may block on a round trip.
pub trait MetadataProvider: Send + Sync {
    /// Bring the cached definition of one table up to date
    ///
    /// Returns a non-negative timestamp when the cache changed, or a negative
    /// value whose magnitude is the current timestamp when nothing changed.
    fn refresh(&self, schema: &str, table: &str) -> Result<i64>;

    /// Currently cached view of a schema, failing with `SchemaNotFound`
    fn schema(&self, name: &str) -> Result<Arc<Schema>>;
}
