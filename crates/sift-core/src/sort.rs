use crate::{params::ParamBag, value::Value};
use serde::{Deserialize, Serialize};
use sift_schema::TableSchema;

///
/// SortKey
///
/// One resolved sort directive. Order within the emitted list is
/// significant (primary, secondary, ...). Backends honoring `nulls_first`
/// render a synthetic leading is-null grouping per column so the composite
/// ordering stays stable across keys.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
    pub nulls_first: bool,
}

impl SortKey {
    #[must_use]
    pub fn new(column: impl Into<String>, descending: bool, nulls_first: bool) -> Self {
        Self {
            column: column.into(),
            descending,
            nulls_first,
        }
    }
}

///
/// Resolve sort directives from request parameters.
///
/// Recognized in priority order, first present key wins:
/// 1. `sort`: entries are either bare column names (ascending) or
///    `column -> direction` pairs with the direction matched against
///    asc/desc case-insensitively; anything else skips the entry.
/// 2. `sortBy`: one column or a sequence, all ascending.
/// 3. `sortByDesc`: one column or a sequence, all descending.
///
/// Columns absent from the table schema are dropped without error.
///
#[must_use]
pub(crate) fn resolve_sort(
    params: &ParamBag,
    table: &TableSchema,
    nulls_first: bool,
) -> Vec<SortKey> {
    let mut keys = Vec::new();

    if let Some(value) = params.get("sort").filter(|v| v.is_filled()) {
        collect_sort_entries(value, nulls_first, &mut keys);
    } else if let Some(value) = params.get("sortBy").filter(|v| v.is_filled()) {
        collect_columns(value, false, nulls_first, &mut keys);
    } else if let Some(value) = params.get("sortByDesc").filter(|v| v.is_filled()) {
        collect_columns(value, true, nulls_first, &mut keys);
    }

    keys.retain(|key| table.has_column(&key.column));
    keys
}

fn collect_sort_entries(value: &Value, nulls_first: bool, out: &mut Vec<SortKey>) {
    match value {
        Value::Text(column) => out.push(SortKey::new(column.clone(), false, nulls_first)),
        Value::List(items) => {
            for item in items {
                collect_sort_entries(item, nulls_first, out);
            }
        }
        Value::Map(pairs) => {
            for (column, direction) in pairs {
                if let Some(descending) = parse_direction(direction) {
                    out.push(SortKey::new(column.clone(), descending, nulls_first));
                }
            }
        }
        _ => {}
    }
}

fn collect_columns(value: &Value, descending: bool, nulls_first: bool, out: &mut Vec<SortKey>) {
    match value {
        Value::Text(column) => out.push(SortKey::new(column.clone(), descending, nulls_first)),
        Value::List(items) => {
            for item in items {
                if let Value::Text(column) = item {
                    out.push(SortKey::new(column.clone(), descending, nulls_first));
                }
            }
        }
        _ => {}
    }
}

// asc/desc, case-insensitive; any other token skips the entry.
fn parse_direction(value: &Value) -> Option<bool> {
    match value.as_text()?.trim().to_ascii_lowercase().as_str() {
        "asc" => Some(false),
        "desc" => Some(true),
        _ => None,
    }
}
