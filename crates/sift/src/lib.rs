//! ## Crate layout
//! - `core`: parameter bags, the predicate builder, sort/time resolution,
//!   and the recursive relation walker.
//! - `schema`: column-kind taxonomy, string-likeness classification, and
//!   the memoized per-driver introspection cache.
//!
//! The `prelude` module mirrors the surface a host application uses to wire
//! request filtering onto its query backend.

pub use sift_core as core;
pub use sift_schema as schema;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use sift_core::error::CompileError;
pub use sift_schema::SchemaError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::SearchConfig,
        entity::{EntityDef, RelationDef},
        params::ParamBag,
        predicate::Predicate,
        sort::SortKey,
        time::TimeRange,
        value::Value,
        walk::{CompiledQuery, Compiler, SearchOptions},
    };
    pub use crate::schema::{
        ClassifyConfig, ColumnKind, ColumnMeta, DriverSchema, Introspector, RawColumn,
        SchemaProvider, TableSchema,
    };
}
