use crate::{
    params::ParamBag,
    predicate::{BuildInput, Predicate, build, like_pattern},
    value::Value,
};
use proptest::prelude::*;
use sift_schema::{ColumnKind, ColumnMeta, TableSchema};

fn string_col(name: &str) -> ColumnMeta {
    ColumnMeta {
        name: name.to_string(),
        kind: ColumnKind::String,
        is_string_like: true,
    }
}

fn int_col(name: &str) -> ColumnMeta {
    ColumnMeta {
        name: name.to_string(),
        kind: ColumnKind::Integer,
        is_string_like: false,
    }
}

fn users_table() -> TableSchema {
    TableSchema::new(
        "users".to_string(),
        vec![string_col("name"), int_col("age"), string_col("email")],
    )
}

fn bag(pairs: &[(&str, Value)]) -> ParamBag {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn build_users(
    params: &ParamBag,
    like_keys: &[&str],
    accept_q: bool,
    force_or: bool,
    force_like: bool,
) -> Predicate {
    let table = users_table();
    build(&BuildInput {
        table: &table,
        excluded_keys: &[],
        like_keys,
        params,
        accept_q,
        force_or,
        force_like,
        q_alias: "q",
    })
}

#[test]
fn like_transform_interleaves_wildcards() {
    assert_eq!(like_pattern("AB1").as_deref(), Some("%A%B%1%"));
    assert_eq!(like_pattern("a-b").as_deref(), Some("%a%b%"));
    assert_eq!(like_pattern("--!!"), None);
    assert_eq!(like_pattern(""), None);
}

#[test]
fn empty_bag_compiles_to_a_noop() {
    let predicate = build_users(&ParamBag::new(), &["name"], false, false, false);
    assert!(predicate.is_noop());
}

#[test]
fn broad_search_spans_all_like_columns_and_skips_guarded_exact_columns() {
    let params = bag(&[("q", Value::from("john"))]);
    let predicate = build_users(&params, &["name", "email"], true, false, false);

    // "john" is non-numeric, so the integer column contributes nothing and
    // the exact group collapses.
    assert_eq!(
        predicate,
        Predicate::Or(vec![
            Predicate::like("name", "%j%o%h%n%"),
            Predicate::like("email", "%j%o%h%n%"),
        ])
    );
}

#[test]
fn broad_numeric_search_reaches_the_integer_column() {
    let params = bag(&[("q", Value::from("30"))]);
    let predicate = build_users(&params, &["name", "email"], true, false, false);

    assert_eq!(
        predicate,
        Predicate::And(vec![
            Predicate::Or(vec![
                Predicate::like("name", "%3%0%"),
                Predicate::like("email", "%3%0%"),
            ]),
            Predicate::eq("age", Value::Text("30".to_string())),
        ])
    );
}

#[test]
fn column_specific_search_mixes_like_and_exact_groups() {
    let params = bag(&[("name", Value::from("al")), ("age", Value::Int(30))]);
    let predicate = build_users(&params, &["name"], false, false, false);

    assert_eq!(
        predicate,
        Predicate::And(vec![
            Predicate::like("name", "%a%l%"),
            Predicate::eq("age", Value::Int(30)),
        ])
    );
}

#[test]
fn explicit_column_value_beats_the_broad_q_value() {
    let params = bag(&[("q", Value::from("jo")), ("name", Value::from("al"))]);
    let predicate = build_users(&params, &["name", "email"], true, false, false);

    let Predicate::Or(children) = predicate else {
        panic!("expected an OR group");
    };
    assert!(
        children.contains(&Predicate::like("name", "%a%l%")),
        "name must match its own value, not q"
    );
    assert!(
        children.contains(&Predicate::like("email", "%j%o%")),
        "email falls back to the q value"
    );
}

#[test]
fn null_value_compiles_to_is_null() {
    let params = bag(&[("name", Value::Null)]);
    let predicate = build_users(&params, &[], false, false, false);

    assert_eq!(predicate, Predicate::is_null("name"));
}

#[test]
fn bool_value_compiles_to_integer_equality() {
    let params = bag(&[("age", Value::Bool(true))]);
    let predicate = build_users(&params, &[], false, false, false);

    assert_eq!(predicate, Predicate::eq("age", Value::Int(1)));
}

#[test]
fn sequence_value_compiles_to_membership() {
    let params = bag(&[("age", Value::from(vec![1_i64, 2, 3]))]);
    let predicate = build_users(&params, &[], false, false, false);

    assert_eq!(
        predicate,
        Predicate::in_(
            "age",
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        )
    );
}

#[test]
fn force_like_fans_sequences_out_to_like_leaves() {
    let params = bag(&[("name", Value::from(vec!["al", "bo"]))]);
    let predicate = build_users(&params, &[], false, false, true);

    assert_eq!(
        predicate,
        Predicate::Or(vec![
            Predicate::like("name", "%a%l%"),
            Predicate::like("name", "%b%o%"),
        ])
    );
}

#[test]
fn type_guard_filters_membership_elements() {
    let params = bag(&[(
        "age",
        Value::List(vec![Value::Int(1), Value::from("john"), Value::from("2")]),
    )]);
    let predicate = build_users(&params, &[], false, false, false);

    assert_eq!(
        predicate,
        Predicate::in_("age", vec![Value::Int(1), Value::Text("2".to_string())])
    );
}

#[test]
fn type_guard_can_empty_a_membership_leaf() {
    let params = bag(&[("age", Value::from(vec!["john", "jane"]))]);
    let predicate = build_users(&params, &[], false, false, false);

    assert!(predicate.is_noop());
}

#[test]
fn force_or_joins_exact_leaves_with_or() {
    let params = bag(&[("name", Value::from("al")), ("email", Value::from("bo"))]);
    let predicate = build_users(&params, &[], false, true, false);

    assert_eq!(
        predicate,
        Predicate::Or(vec![
            Predicate::eq("name", Value::Text("al".to_string())),
            Predicate::eq("email", Value::Text("bo".to_string())),
        ])
    );
}

#[test]
fn excluded_columns_never_participate() {
    let table = users_table();
    let params = bag(&[("email", Value::from("x@y")), ("name", Value::from("al"))]);
    let predicate = build(&BuildInput {
        table: &table,
        excluded_keys: &["email"],
        like_keys: &[],
        params: &params,
        accept_q: false,
        force_or: false,
        force_like: false,
        q_alias: "q",
    });

    assert_eq!(predicate, Predicate::eq("name", Value::Text("al".to_string())));
}

#[test]
fn q_alias_is_never_treated_as_a_column() {
    let table = TableSchema::new(
        "odd".to_string(),
        vec![string_col("q"), string_col("name")],
    );
    let params = bag(&[("q", Value::from("jo"))]);
    let predicate = build(&BuildInput {
        table: &table,
        excluded_keys: &[],
        like_keys: &["name"],
        params: &params,
        accept_q: true,
        force_or: false,
        force_like: false,
        q_alias: "q",
    });

    assert_eq!(
        predicate,
        Predicate::like("name", "%j%o%"),
        "the reserved alias must not compile as the literal column 'q'"
    );
}

// Collect the column names referenced by the LIKE and non-LIKE leaves of a
// compiled predicate.
fn partition_columns(predicate: &Predicate, like: &mut Vec<String>, exact: &mut Vec<String>) {
    match predicate {
        Predicate::True => {}
        Predicate::And(children) | Predicate::Or(children) => {
            for child in children {
                partition_columns(child, like, exact);
            }
        }
        Predicate::Like { column, .. } => like.push(column.clone()),
        Predicate::Eq { column, .. }
        | Predicate::In { column, .. }
        | Predicate::IsNull { column } => exact.push(column.clone()),
        Predicate::Has { predicate, .. } => partition_columns(predicate, like, exact),
    }
}

proptest! {
    #[test]
    fn like_pattern_is_wildcard_interleaved_alnum(source in ".{0,32}") {
        match like_pattern(&source) {
            None => {
                prop_assert!(!source.chars().any(|c| c.is_ascii_alphanumeric()));
            }
            Some(pattern) => {
                prop_assert!(pattern.starts_with('%'));
                prop_assert!(pattern.ends_with('%'));

                let kept: String = pattern.chars().filter(|c| *c != '%').collect();
                let expected: String =
                    source.chars().filter(char::is_ascii_alphanumeric).collect();
                prop_assert_eq!(kept, expected);

                // Strictly alternating: every kept character is followed by
                // a wildcard.
                prop_assert_eq!(
                    pattern.chars().filter(|c| *c == '%').count(),
                    pattern.chars().filter(|c| *c != '%').count() + 1
                );
            }
        }
    }

    #[test]
    fn no_column_lands_in_both_groups(
        q in proptest::option::of("[a-z0-9]{1,8}"),
        name in proptest::option::of("[a-z0-9]{1,8}"),
        age in proptest::option::of(0_i64..200),
    ) {
        let mut pairs: Vec<(&str, Value)> = Vec::new();
        if let Some(q) = &q {
            pairs.push(("q", Value::from(q.as_str())));
        }
        if let Some(name) = &name {
            pairs.push(("name", Value::from(name.as_str())));
        }
        if let Some(age) = age {
            pairs.push(("age", Value::Int(age)));
        }

        let params = bag(&pairs);
        let accept_q = params.filled("q");
        let predicate = build_users(&params, &["name", "email"], accept_q, false, false);

        let mut like = Vec::new();
        let mut exact = Vec::new();
        partition_columns(&predicate, &mut like, &mut exact);

        for column in &like {
            prop_assert!(
                !exact.contains(column),
                "column '{}' appears in both the LIKE and EXACT groups",
                column
            );
        }
    }
}
