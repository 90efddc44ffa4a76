//! widecol-core: FROM-clause name resolution for a wide-column SQL layer
//!
//! This library turns the table names, aliases, column family qualifiers and
//! query-time column declarations of one statement into resolved table and
//! column references, consulting a possibly stale metadata cache.

pub mod ast;
pub mod error;
pub mod metadata;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod types;

pub use ast::{ColumnDef, ColumnName, Statement, TableNode};
pub use error::{ErrorKind, ResolveError, Result};
pub use metadata::{InMemoryProvider, MetadataProvider};
pub use resolver::{
    resolver_for, resolver_with_dynamic_columns, ColumnRef, ColumnResolver, Resolver, TableRef,
};
pub use schema::{Column, ColumnFamily, Schema, Table, TableBuilder, TableName};
pub use session::Session;
pub use types::DataType;
