use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::SchemaError,
    types::{ColumnKind, ColumnMeta},
};

///
/// ClassifyConfig
///
/// String-likeness policy: which column kinds are non-string (everything
/// else defaults to string-like), plus a per-driver remap for raw type names
/// the introspector reports outside the canonical taxonomy (spatial and enum
/// types in particular).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ClassifyConfig {
    non_string_kinds: BTreeSet<ColumnKind>,
    /// driver -> raw type name -> canonical kind
    overrides: BTreeMap<String, BTreeMap<String, ColumnKind>>,
}

impl ClassifyConfig {
    #[must_use]
    pub const fn new(
        non_string_kinds: BTreeSet<ColumnKind>,
        overrides: BTreeMap<String, BTreeMap<String, ColumnKind>>,
    ) -> Self {
        Self {
            non_string_kinds,
            overrides,
        }
    }

    /// Register an override mapping for one driver's raw type name.
    pub fn add_override(&mut self, driver: &str, type_name: &str, kind: ColumnKind) {
        self.overrides
            .entry(driver.to_string())
            .or_default()
            .insert(type_name.to_string(), kind);
    }

    #[must_use]
    pub fn is_string_like(&self, kind: ColumnKind) -> bool {
        !self.non_string_kinds.contains(&kind)
    }

    /// Classify one raw introspected column into `ColumnMeta`.
    ///
    /// The override table is consulted before the taxonomy parse, so drivers
    /// can remap type names the taxonomy rejects or mis-files.
    pub fn classify(
        &self,
        driver: &str,
        table: &str,
        column: &str,
        type_name: &str,
    ) -> Result<ColumnMeta, SchemaError> {
        let overridden = self
            .overrides
            .get(driver)
            .and_then(|map| map.get(type_name))
            .copied();

        let kind = match overridden {
            Some(kind) => kind,
            None => {
                type_name
                    .parse::<ColumnKind>()
                    .map_err(|_| SchemaError::UnknownColumnKind {
                        driver: driver.to_string(),
                        table: table.to_string(),
                        column: column.to_string(),
                        type_name: type_name.to_string(),
                    })?
            }
        };

        Ok(ColumnMeta {
            name: column.to_string(),
            kind,
            is_string_like: self.is_string_like(kind),
        })
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        let non_string_kinds = BTreeSet::from([
            ColumnKind::BigInt,
            ColumnKind::Blob,
            ColumnKind::Boolean,
            ColumnKind::DateTime,
            ColumnKind::Float,
            ColumnKind::Integer,
            ColumnKind::Json,
            ColumnKind::SmallInt,
            ColumnKind::Geometry,
            ColumnKind::GeometryCollection,
            ColumnKind::Point,
            ColumnKind::MultiPoint,
            ColumnKind::Polygon,
            ColumnKind::MultiPolygon,
        ]);

        // mysql reports spatial and enum columns under names that need
        // remapping before they classify.
        let mysql = BTreeMap::from([
            ("linestring".to_string(), ColumnKind::String),
            ("multilinestring".to_string(), ColumnKind::String),
            ("enum".to_string(), ColumnKind::String),
            ("geometry".to_string(), ColumnKind::Float),
            ("geometrycollection".to_string(), ColumnKind::Float),
            ("point".to_string(), ColumnKind::Float),
            ("multipoint".to_string(), ColumnKind::Float),
            ("polygon".to_string(), ColumnKind::Float),
            ("multipolygon".to_string(), ColumnKind::Float),
        ]);

        Self {
            non_string_kinds,
            overrides: BTreeMap::from([("mysql".to_string(), mysql)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_kinds_classify_without_overrides() {
        let config = ClassifyConfig::default();

        let name = config
            .classify("mysql", "users", "name", "string")
            .expect("string column should classify");
        assert!(name.is_string_like, "string columns are string-like");

        let age = config
            .classify("mysql", "users", "age", "integer")
            .expect("integer column should classify");
        assert_eq!(age.kind, ColumnKind::Integer);
        assert!(!age.is_string_like, "integer columns are not string-like");
    }

    #[test]
    fn mysql_enum_remaps_to_string_like() {
        let config = ClassifyConfig::default();
        let col = config
            .classify("mysql", "users", "status", "enum")
            .expect("enum should classify through the override map");

        assert_eq!(col.kind, ColumnKind::String);
        assert!(col.is_string_like);
    }

    #[test]
    fn mysql_point_remaps_to_non_string() {
        let config = ClassifyConfig::default();
        let col = config
            .classify("mysql", "places", "location", "point")
            .expect("point should classify through the override map");

        assert_eq!(col.kind, ColumnKind::Float);
        assert!(!col.is_string_like);
    }

    #[test]
    fn unknown_type_without_override_is_an_error() {
        let config = ClassifyConfig::default();
        let err = config
            .classify("pgsql", "docs", "embedding", "vector")
            .expect_err("unmapped type should fail classification");

        assert_eq!(
            err,
            SchemaError::UnknownColumnKind {
                driver: "pgsql".to_string(),
                table: "docs".to_string(),
                column: "embedding".to_string(),
                type_name: "vector".to_string(),
            }
        );
    }

    #[test]
    fn added_override_resolves_a_previously_unknown_type() {
        let mut config = ClassifyConfig::default();
        config.add_override("pgsql", "vector", ColumnKind::Blob);

        let col = config
            .classify("pgsql", "docs", "embedding", "vector")
            .expect("override should make the type classify");
        assert_eq!(col.kind, ColumnKind::Blob);
        assert!(!col.is_string_like);
    }
}
