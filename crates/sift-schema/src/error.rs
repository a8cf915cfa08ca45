use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Boundary errors from introspection and classification. A failed driver
/// population is cached and re-surfaced as-is on later lookups; the
/// operational fix for classification failures is the override map.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("table '{table}' does not exist in the introspected schema for driver '{driver}'")]
    UnknownTable { driver: String, table: String },

    #[error(
        "column '{table}.{column}' has unclassifiable type '{type_name}' on driver '{driver}'; map it via the override table"
    )]
    UnknownColumnKind {
        driver: String,
        table: String,
        column: String,
        type_name: String,
    },

    #[error("schema introspection failed for driver '{driver}': {message}")]
    Introspection { driver: String, message: String },
}
