mod merge;
pub use merge::*;

mod loader;
pub use loader::*;

use serde::{Deserialize, Serialize};
use serde_extensions::{DottedPath, Merge};
use serde_json::{Map, Number, Value};

use crate::RenderError;

/// Key of the metadata mapping every rendered context carries
pub const META: &str = "_meta";

/// The data a template is rendered against.
///
/// Always a mapping at the top level. Created fresh for every render, mutated in place by
/// the merge and transform stages and consumed once by template invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    pub fn new() -> Context {
        Context(Map::new())
    }

    pub fn from_value(value: Value) -> Result<Context, RenderError> {
        match value {
            Value::Object(map) => Ok(Context(map)),
            other => Err(RenderError::load(format!(
                "context must be a mapping, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Deep merge an overlay, the overlay wins on conflicting keys
    pub fn extend(&mut self, overlay: Value) {
        match overlay {
            Value::Object(map) => self.0.merge(map),
            Value::Null => {}
            other => log::warn!(
                "Ignoring context overlay that is not a mapping: {}",
                type_name(&other)
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Lookup using a dotted path, `_meta.pagename`
    pub fn dotted(&self, path: &str) -> Option<&Value> {
        self.0.dotted(path)
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.0.get(META)?.get(key)?.as_str()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(value: Map<String, Value>) -> Self {
        Context(value)
    }
}

impl TryFrom<Value> for Context {
    type Error = RenderError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Context::from_value(value)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Convert toml content into the json value model used by contexts.
/// Datetimes become their RFC 3339 string.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn context_must_be_a_mapping() {
        assert!(Context::from_value(json!([1, 2])).is_err());
        let context = Context::from_value(json!({"_meta": {"culture": "en"}})).unwrap();
        assert_eq!(context.meta("culture"), Some("en"));
    }

    #[test]
    fn toml_datetimes_become_strings() {
        let table: toml::Table = toml::from_str("published = 2024-01-02\nscore = 1.5").unwrap();
        let value = toml_to_json(toml::Value::Table(table));
        assert_eq!(value, json!({"published": "2024-01-02", "score": 1.5}));
    }
}
