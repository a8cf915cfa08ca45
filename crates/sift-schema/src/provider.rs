use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, OnceLock},
};

use crate::{
    classify::ClassifyConfig,
    error::SchemaError,
    types::{DriverSchema, TableSchema},
};

///
/// RawColumn
///
/// One column as the introspector reports it, before classification.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub type_name: String,
}

impl RawColumn {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

///
/// Introspector
///
/// Read-only schema source. Implementations wrap whatever metadata surface
/// the backing engine exposes; the provider consults them exactly once per
/// driver.
///

pub trait Introspector {
    fn list_tables(&self, driver: &str) -> Result<Vec<String>, SchemaError>;

    fn list_columns(&self, driver: &str, table: &str) -> Result<Vec<RawColumn>, SchemaError>;
}

type DriverSlot = Arc<OnceLock<Result<Arc<DriverSchema>, SchemaError>>>;

///
/// SchemaProvider
///
/// Memoized schema boundary. Each driver is introspected and classified at
/// most once per process; concurrent first callers share a single in-flight
/// population through the per-driver `OnceLock`, and every later call serves
/// the immutable cached value. A failed population is cached too: it is
/// surfaced on every lookup rather than retried, since the fix (an override
/// mapping) requires a config change anyway.
///

pub struct SchemaProvider<I> {
    introspector: I,
    config: ClassifyConfig,
    cache: Mutex<HashMap<String, DriverSlot>>,
}

impl<I: Introspector> SchemaProvider<I> {
    #[must_use]
    pub fn new(introspector: I, config: ClassifyConfig) -> Self {
        Self {
            introspector,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch (populating on first use) the schema for one driver.
    pub fn driver_schema(&self, driver: &str) -> Result<Arc<DriverSchema>, SchemaError> {
        let slot = {
            let mut cache = self
                .cache
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            cache.entry(driver.to_string()).or_default().clone()
        };

        // get_or_init blocks concurrent initializers, which is exactly the
        // single-flight contract: one populate, everyone else awaits it.
        slot.get_or_init(|| self.populate(driver)).clone()
    }

    fn populate(&self, driver: &str) -> Result<Arc<DriverSchema>, SchemaError> {
        tracing::debug!(driver, "populating schema cache");

        let mut tables = BTreeMap::new();

        for table in self.introspector.list_tables(driver)? {
            let mut columns = Vec::new();
            for raw in self.introspector.list_columns(driver, &table)? {
                columns.push(
                    self.config
                        .classify(driver, &table, &raw.name, &raw.type_name)?,
                );
            }
            tables.insert(table.clone(), TableSchema::new(table, columns));
        }

        tracing::debug!(driver, tables = tables.len(), "schema cache populated");

        Ok(Arc::new(DriverSchema::new(driver.to_string(), tables)))
    }
}
