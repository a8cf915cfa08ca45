use crate::value::Value;
use serde::Serialize;
use std::{
    fmt,
    ops::{BitAnd, BitOr},
};

///
/// Predicate
///
/// Pure representation of a compiled filter. This layer carries no schema
/// knowledge and no execution semantics; any query-builder backend can walk
/// it and emit its own clauses. `Has` is a semi-join against a named
/// relation: rows qualify when at least one related row satisfies the inner
/// predicate.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Predicate {
    /// Identity element: no constraint.
    True,
    And(Vec<Self>),
    Or(Vec<Self>),
    Eq { column: String, value: Value },
    Like { column: String, pattern: String },
    In { column: String, values: Vec<Value> },
    IsNull { column: String },
    Has {
        relation: String,
        predicate: Box<Self>,
    },
}

impl Predicate {
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    #[must_use]
    pub fn in_(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            column: column.into(),
            values,
        }
    }

    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
        }
    }

    #[must_use]
    pub fn has(relation: impl Into<String>, predicate: Self) -> Self {
        Self::Has {
            relation: relation.into(),
            predicate: Box::new(predicate),
        }
    }

    /// No constraint at all.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::True)
    }

    ///
    /// Conjoin parts into an AND group.
    ///
    /// Neutral elements are removed and nested AND nodes are flattened; an
    /// empty group collapses to `True`.
    ///
    #[must_use]
    pub fn conjoin(parts: Vec<Self>) -> Self {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Self::True => {}
                Self::And(children) => out.extend(children),
                other => out.push(other),
            }
        }

        match out.len() {
            0 => Self::True,
            1 => out.remove(0),
            _ => Self::And(out),
        }
    }

    ///
    /// Disjoin parts into an OR group.
    ///
    /// Nested OR nodes are flattened. An empty group collapses to `True`
    /// (a group that contributed no leaves is a no-op, not a contradiction).
    ///
    #[must_use]
    pub fn disjoin(parts: Vec<Self>) -> Self {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Self::True => {}
                Self::Or(children) => out.extend(children),
                other => out.push(other),
            }
        }

        match out.len() {
            0 => Self::True,
            1 => out.remove(0),
            _ => Self::Or(out),
        }
    }

    /// Group leaves with one connective.
    #[must_use]
    pub(crate) fn group(leaves: Vec<Self>, or_joined: bool) -> Self {
        if or_joined {
            Self::disjoin(leaves)
        } else {
            Self::conjoin(leaves)
        }
    }

    ///
    /// Attach a further constraint onto an accumulated predicate, the way a
    /// fluent query builder chains clauses: the first real constraint
    /// replaces the identity, later ones connect with AND or OR.
    ///
    #[must_use]
    pub(crate) fn attach(self, node: Self, or_joined: bool) -> Self {
        if self.is_noop() {
            node
        } else if or_joined {
            Self::Or(vec![self, node])
        } else {
            Self::And(vec![self, node])
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

// SQL-ish rendering for diagnostics and test assertions; not an escape-safe
// statement builder.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "TRUE"),
            Self::And(children) => fmt_group(f, children, " AND "),
            Self::Or(children) => fmt_group(f, children, " OR "),
            Self::Eq { column, value } => {
                write!(f, "{column} = ")?;
                value.fmt_sql(f)
            }
            Self::Like { column, pattern } => write!(f, "{column} LIKE '{pattern}'"),
            Self::In { column, values } => {
                write!(f, "{column} IN ")?;
                Value::List(values.clone()).fmt_sql(f)
            }
            Self::IsNull { column } => write!(f, "{column} IS NULL"),
            Self::Has {
                relation,
                predicate,
            } => write!(f, "EXISTS {relation}({predicate})"),
        }
    }
}

fn fmt_group(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}
