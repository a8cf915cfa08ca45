//! Schema boundary for Sift: column-kind taxonomy, string-likeness
//! classification, and the memoized per-driver introspection cache.

pub mod classify;
pub mod error;
pub mod provider;
pub mod types;

pub use classify::ClassifyConfig;
pub use error::SchemaError;
pub use provider::{Introspector, RawColumn, SchemaProvider};
pub use types::{ColumnKind, ColumnMeta, DriverSchema, TableSchema};
