//! Table metadata model

mod builder;
mod catalog;

pub use builder::{ColumnSpec, TableBuilder};
pub use catalog::{
    Column, ColumnFamily, Schema, Table, TableKind, TableName, DEFAULT_COLUMN_FAMILY,
    UNSET_TIMESTAMP,
};
