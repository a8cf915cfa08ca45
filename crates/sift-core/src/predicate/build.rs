use crate::{params::ParamBag, predicate::ast::Predicate, value::Value};
use sift_schema::{ColumnMeta, TableSchema};

///
/// BuildInput
///
/// Everything the predicate builder needs for one entity scope. The bag has
/// already been normalized for this scope; the builder only partitions,
/// guards, and emits leaves.
///

pub(crate) struct BuildInput<'a> {
    pub table: &'a TableSchema,
    pub excluded_keys: &'a [&'a str],
    pub like_keys: &'a [&'a str],
    pub params: &'a ParamBag,
    /// The q alias is present and filled, and q is not ignored: broad
    /// all-column search mode.
    pub accept_q: bool,
    pub force_or: bool,
    pub force_like: bool,
    pub q_alias: &'a str,
}

///
/// Compile one entity scope into a predicate.
///
/// Partitioning: under `accept_q` every searchable column participates
/// (the configured like-columns fuzzy-match, the rest compare exactly
/// against the q value); otherwise only explicitly supplied columns
/// participate. The like-group and exact-group are internally OR-joined
/// when `accept_q` or `force_or` holds, AND-joined otherwise, and the two
/// groups always combine as a conjunction. A column never lands in both
/// groups.
///
pub(crate) fn build(input: &BuildInput<'_>) -> Predicate {
    if input.params.is_empty() {
        return Predicate::True;
    }

    // Excluded keys never participate, and the q alias is never a column.
    let prepared: Vec<&ColumnMeta> = input
        .table
        .columns()
        .iter()
        .filter(|col| {
            !input.excluded_keys.contains(&col.name.as_str()) && col.name != input.q_alias
        })
        .collect();

    let like_configured: Vec<&ColumnMeta> = input
        .like_keys
        .iter()
        .filter_map(|key| prepared.iter().find(|col| col.name == *key).copied())
        .collect();

    let (like_set, exact_set): (Vec<&ColumnMeta>, Vec<&ColumnMeta>) = if input.accept_q {
        let exact = prepared
            .iter()
            .filter(|col| !like_configured.iter().any(|l| l.name == col.name))
            .copied()
            .collect();
        (like_configured, exact)
    } else {
        let like: Vec<&ColumnMeta> = input
            .params
            .keys()
            .filter_map(|key| like_configured.iter().find(|col| col.name == key).copied())
            .collect();
        let exact = input
            .params
            .keys()
            .filter_map(|key| prepared.iter().find(|col| col.name == key).copied())
            .filter(|col| !like.iter().any(|l| l.name == col.name))
            .collect();
        (like, exact)
    };

    let or_joined = input.accept_q || input.force_or;
    let q_value = input.params.get(input.q_alias);

    let mut like_leaves = Vec::new();
    for &col in &like_set {
        // An explicit per-column value beats the broad q value.
        let value = match input.params.get(&col.name) {
            Some(value) => value,
            None => match q_value {
                Some(value) if input.accept_q => value,
                _ => continue,
            },
        };

        if let Some(leaf) = match value {
            Value::List(items) => fan_out_like(col, items),
            scalar => like_leaf(col, scalar),
        } {
            like_leaves.push(leaf);
        }
    }

    let mut exact_leaves = Vec::new();
    for &col in &exact_set {
        let value = match input.params.get(&col.name) {
            Some(value) => value,
            None => match q_value {
                Some(value) if input.accept_q => value,
                _ => continue,
            },
        };

        if let Some(leaf) = match value {
            Value::List(items) => {
                if input.force_like {
                    fan_out_like(col, items)
                } else {
                    in_leaf(col, items)
                }
            }
            scalar => exact_leaf(col, scalar, input.force_like),
        } {
            exact_leaves.push(leaf);
        }
    }

    Predicate::conjoin(vec![
        Predicate::group(like_leaves, or_joined),
        Predicate::group(exact_leaves, or_joined),
    ])
}

///
/// Wildcard transform for fuzzy matching: every alphanumeric character of
/// the source, each followed by `%`, the whole prefixed with `%`. A source
/// with no alphanumeric characters yields no pattern.
///
/// `"AB1"` becomes `"%A%B%1%"`; `"a-b"` becomes `"%a%b%"`.
///
#[must_use]
pub(crate) fn like_pattern(source: &str) -> Option<String> {
    let mut pattern = String::from("%");
    for ch in source.chars() {
        if ch.is_ascii_alphanumeric() {
            pattern.push(ch);
            pattern.push('%');
        }
    }

    if pattern.len() == 1 { None } else { Some(pattern) }
}

// Silent skip: a non-numeric string compared against a non-string column
// would produce an invalid comparison, so the column contributes no leaf.
fn guard_allows(col: &ColumnMeta, value: &Value) -> bool {
    col.is_string_like || !value.is_non_numeric_text()
}

fn like_leaf(col: &ColumnMeta, value: &Value) -> Option<Predicate> {
    if !guard_allows(col, value) {
        return None;
    }

    match value {
        Value::Null => Some(Predicate::is_null(&col.name)),
        Value::Bool(v) => Some(Predicate::eq(&col.name, Value::Int(i64::from(*v)))),
        scalar => {
            let pattern = like_pattern(&scalar.like_source()?)?;
            Some(Predicate::like(&col.name, pattern))
        }
    }
}

// Sequence values fan out to one LIKE leaf per element, OR-joined.
fn fan_out_like(col: &ColumnMeta, items: &[Value]) -> Option<Predicate> {
    let leaves: Vec<Predicate> = items
        .iter()
        .filter_map(|item| like_leaf(col, item))
        .collect();

    if leaves.is_empty() {
        None
    } else {
        Some(Predicate::disjoin(leaves))
    }
}

fn in_leaf(col: &ColumnMeta, items: &[Value]) -> Option<Predicate> {
    // The guard filters elements; a membership list with no valid element
    // contributes nothing.
    let values: Vec<Value> = items
        .iter()
        .filter(|item| guard_allows(col, item))
        .cloned()
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(Predicate::in_(&col.name, values))
    }
}

fn exact_leaf(col: &ColumnMeta, value: &Value, force_like: bool) -> Option<Predicate> {
    if !guard_allows(col, value) {
        return None;
    }

    match value {
        Value::Null => Some(Predicate::is_null(&col.name)),
        Value::Bool(v) => Some(Predicate::eq(&col.name, Value::Int(i64::from(*v)))),
        scalar if force_like => {
            let pattern = like_pattern(&scalar.like_source()?)?;
            Some(Predicate::like(&col.name, pattern))
        }
        Value::Text(s) if s.is_empty() => None,
        scalar => Some(Predicate::eq(&col.name, scalar.clone())),
    }
}
