use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SchemaError;

///
/// ColumnKind
///
/// Canonical column-type taxonomy, aligned with the base type names common
/// relational introspectors report. Raw driver-specific type names that do
/// not parse into this taxonomy must be remapped through the per-driver
/// override table before classification.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum ColumnKind {
    BigInt,
    Blob,
    Boolean,
    Date,
    DateTime,
    DateTimeTz,
    Decimal,
    Enum,
    Float,
    Geometry,
    GeometryCollection,
    Guid,
    Integer,
    Json,
    LineString,
    MultiLineString,
    MultiPoint,
    MultiPolygon,
    Point,
    Polygon,
    SmallInt,
    String,
    Text,
    Time,
}

impl ColumnKind {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::BigInt | Self::Integer | Self::SmallInt)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, Self::Decimal | Self::Float)
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date | Self::DateTime | Self::DateTimeTz | Self::Time
        )
    }

    #[must_use]
    pub const fn is_spatial(self) -> bool {
        matches!(
            self,
            Self::Geometry
                | Self::GeometryCollection
                | Self::LineString
                | Self::MultiLineString
                | Self::MultiPoint
                | Self::MultiPolygon
                | Self::Point
                | Self::Polygon
        )
    }

    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Enum | Self::Guid | Self::String | Self::Text)
    }
}

///
/// ColumnMeta
///
/// One classified column: its canonical kind plus the string-likeness flag
/// the predicate builder keys off. Derived once per `(driver, table)`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
    pub is_string_like: bool,
}

///
/// TableSchema
///
/// Ordered column set for one table. Column order follows the introspector.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSchema {
    pub name: String,
    columns: Vec<ColumnMeta>,
}

impl TableSchema {
    #[must_use]
    pub const fn new(name: String, columns: Vec<ColumnMeta>) -> Self {
        Self { name, columns }
    }

    /// Columns in introspection order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Look up one column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|col| col.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

///
/// DriverSchema
///
/// Every introspected table for one driver, keyed by table name. Immutable
/// once built; served from the provider cache for process lifetime.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DriverSchema {
    pub driver: String,
    tables: BTreeMap<String, TableSchema>,
}

impl DriverSchema {
    #[must_use]
    pub const fn new(driver: String, tables: BTreeMap<String, TableSchema>) -> Self {
        Self { driver, tables }
    }

    /// Look up a table, failing when it was not introspected.
    pub fn try_table(&self, table: &str) -> Result<&TableSchema, SchemaError> {
        self.tables.get(table).ok_or_else(|| SchemaError::UnknownTable {
            driver: self.driver.clone(),
            table: table.to_string(),
        })
    }

    #[must_use]
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Iterate tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_kind_parses_lowercase_introspector_names() {
        assert_eq!(
            "bigint".parse::<ColumnKind>().expect("bigint should parse"),
            ColumnKind::BigInt
        );
        assert_eq!(
            "geometrycollection"
                .parse::<ColumnKind>()
                .expect("geometrycollection should parse"),
            ColumnKind::GeometryCollection
        );
        assert!(
            "vector".parse::<ColumnKind>().is_err(),
            "unmapped type names must not classify implicitly"
        );
    }

    #[test]
    fn missing_table_lookup_reports_driver_and_table() {
        let schema = DriverSchema::new("mysql".to_string(), BTreeMap::new());
        let err = schema
            .try_table("users")
            .expect_err("missing table should fail lookup");

        assert_eq!(
            err,
            SchemaError::UnknownTable {
                driver: "mysql".to_string(),
                table: "users".to_string(),
            }
        );
    }
}
