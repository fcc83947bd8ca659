//! The resolution target: option key to resolved value.
//!
//! Writes go through the setter (see [`ConfigStore::set`]), which enforces
//! negation, the `none` sentinel, validity sets, stream binding and
//! accumulation. Readers distinguish a key that was never set
//! ([`get`](ConfigStore::get) returns `None`) from one the `none` sentinel
//! nulled (`Some(Value::Null)`).

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ConfigError, Origin};
use crate::resolve;
use crate::schema::OptionKey;
use crate::types::{OutputStream, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    values: BTreeMap<OptionKey, Value>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to the option called `name`, through the full setter.
    ///
    /// Returns the value now stored, or `None` when the assignment was a
    /// no-op (a negation option given `false`).
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<&Value>, ConfigError> {
        resolve::apply(self, name, value.into(), &Origin::Api)
    }

    pub fn get(&self, key: OptionKey) -> Option<&Value> {
        self.values.get(&key)
    }

    pub fn has(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    /// `true` only for a stored `true`; absent and null read as `false`.
    pub fn flag(&self, key: OptionKey) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn int(&self, key: OptionKey) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn str(&self, key: OptionKey) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// String elements of a list-valued option, in arrival order.
    pub fn list(&self, key: OptionKey) -> Vec<&str> {
        self.get(key)
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn stream(&self, key: OptionKey) -> Option<&OutputStream> {
        self.get(key).and_then(Value::as_stream)
    }

    /// Where `--printmarc`/`--printdoc` output goes. `None` means suppressed.
    pub fn debug_stream(&self) -> Option<OutputStream> {
        self.stream(OptionKey::DebugFile).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn take(&mut self, key: OptionKey) -> Option<Value> {
        self.values.remove(&key)
    }

    pub(crate) fn put(&mut self, key: OptionKey, value: Value) -> &Value {
        self.values.insert(key, value);
        &self.values[&key]
    }
}

impl Serialize for ConfigStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key.name(), value)?;
        }
        map.end()
    }
}

impl fmt::Display for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.values.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {value}", key.name())?;
        }
        Ok(())
    }
}
