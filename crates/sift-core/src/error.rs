use sift_schema::SchemaError;
use thiserror::Error as ThisError;

///
/// CompileError
///
/// Unrecoverable failures of one compile call. Every variant propagates to
/// the caller; the only deliberately silent behaviors in the compiler are
/// the non-numeric-vs-non-string type guard and unknown sort columns.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("filter input must be a key-unique mapping: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("relation '{relation}' is not declared as searchable on entity '{entity}'")]
    UnknownRelation {
        entity: &'static str,
        relation: String,
    },

    #[error("relation recursion on entity '{entity}' exceeded the configured maximum depth {max_depth}")]
    MaxDepthExceeded {
        entity: &'static str,
        max_depth: usize,
    },
}

impl CompileError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
