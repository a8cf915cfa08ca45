use crate::{error::CompileError, value::Value};

///
/// ParamBag
///
/// Insertion-ordered, key-unique parameter mapping for one filter scope.
/// This is the single input abstraction: HTTP request parameters, plain
/// maps, and relation-scoped slices all arrive here.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamBag {
    entries: Vec<(String, Value)>,
}

impl ParamBag {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a bag from a JSON mapping. Anything other than an object is
    /// rejected: a positional sequence is not a key-unique mapping.
    pub fn from_json(json: serde_json::Value) -> Result<Self, CompileError> {
        match json {
            serde_json::Value::Object(map) => {
                let mut bag = Self::new();
                for (key, value) in map {
                    bag.insert(key, Value::from_json(value))?;
                }
                Ok(bag)
            }
            other => Err(CompileError::invalid_input(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Coerce loose request shapes into a bag: an object stays a bag, a
    /// positional array of scalars becomes a broad-search sequence under the
    /// q alias, and a bare scalar becomes a broad-search term.
    pub fn coerce(json: serde_json::Value, q_alias: &str) -> Result<Self, CompileError> {
        match json {
            serde_json::Value::Object(_) => Self::from_json(json),
            serde_json::Value::Array(items) => {
                let mut bag = Self::new();
                bag.insert(
                    q_alias.to_string(),
                    Value::List(items.into_iter().map(Value::from_json).collect()),
                )?;
                Ok(bag)
            }
            scalar => {
                let mut bag = Self::new();
                bag.insert(q_alias.to_string(), Value::from_json(scalar))?;
                Ok(bag)
            }
        }
    }

    /// Insert a new entry, rejecting duplicate keys.
    pub fn insert(&mut self, key: String, value: Value) -> Result<(), CompileError> {
        if self.has(&key) {
            return Err(CompileError::invalid_input(format!(
                "duplicate parameter key '{key}'"
            )));
        }
        self.entries.push((key, value));
        Ok(())
    }

    // Replace-or-append used during normalization, where a prefixed key can
    // legitimately shadow an earlier pass-through entry (last one wins).
    fn set(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Present with a non-empty value.
    #[must_use]
    pub fn filled(&self, key: &str) -> bool {
        self.get(key).is_some_and(Value::is_filled)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A bag whose only entry is a filled q alias: the broad-search-only
    /// shape the relation walker treats specially.
    #[must_use]
    pub fn is_lone(&self, key: &str) -> bool {
        self.len() == 1 && self.filled(key)
    }

    ///
    /// Carve the subset of this bag relevant to one entity or relation
    /// scope.
    ///
    /// Excluded keys are removed first, then blank entries (whitespace-only
    /// strings, empty sequences; blank elements inside a sequence are
    /// scrubbed, and a sequence left empty drops with them). With no prepend
    /// key the filtered bag passes through, minus the q alias when q is
    /// ignored. With a prepend key only entries named `{prepend}_*` are
    /// retained, prefix stripped; the q alias additionally passes through
    /// unprefixed unless q is ignored.
    ///
    #[must_use]
    pub fn normalize(
        &self,
        excluded_keys: &[&str],
        prepend_key: Option<&str>,
        ignore_q: bool,
        q_alias: &str,
    ) -> Self {
        let prefix = prepend_key.map(|p| format!("{p}_"));
        let mut out = Self::new();

        for (key, value) in &self.entries {
            if excluded_keys.iter().any(|excluded| *excluded == key) {
                continue;
            }

            let value = scrub(value);
            if value.is_blank() {
                continue;
            }

            match &prefix {
                None => {
                    if ignore_q && key == q_alias {
                        continue;
                    }
                    out.set(key.clone(), value);
                }
                Some(prefix) => {
                    if let Some(stripped) = key.strip_prefix(prefix) {
                        if ignore_q && stripped == q_alias {
                            continue;
                        }
                        out.set(stripped.to_string(), value);
                    } else if !ignore_q && key == q_alias {
                        out.set(key.clone(), value);
                    }
                }
            }
        }

        out
    }
}

// Drop blank elements inside sequences; scalars pass through.
fn scrub(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(
            items
                .iter()
                .filter(|item| !item.is_blank())
                .cloned()
                .collect(),
        ),
        other => other.clone(),
    }
}

impl FromIterator<(String, Value)> for ParamBag {
    /// Test/bench convenience; later duplicates overwrite earlier entries.
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.set(key, value);
        }
        bag
    }
}
