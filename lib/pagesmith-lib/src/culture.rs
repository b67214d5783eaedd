use serde_json::{Map, Value};

use crate::Context;

/// Separates a key from the culture of its localized variant, `title@fr`
pub const CULTURE_SEPARATOR: char = '@';

/// Projects a context into its locale specific view. Must not mutate the input.
pub trait Culturalizer: Send + Sync {
    fn project(&self, context: &Context, culture: &str) -> Context;
}

/// `name@<culture>` replaces `name` for that culture, variants for other cultures are dropped
#[derive(Debug, Clone, Default)]
pub struct Babel;

impl Babel {
    pub fn new() -> Babel {
        Babel
    }

    fn project_map(map: &Map<String, Value>, culture: &str) -> Map<String, Value> {
        let mut projected = Map::new();
        for (key, value) in map {
            if !key.contains(CULTURE_SEPARATOR) {
                projected.insert(key.clone(), Self::project_value(value, culture));
            }
        }
        for (key, value) in map {
            if let Some((base, key_culture)) = key.rsplit_once(CULTURE_SEPARATOR) {
                if key_culture == culture && !base.is_empty() {
                    projected.insert(base.to_owned(), Self::project_value(value, culture));
                }
            }
        }
        projected
    }

    fn project_value(value: &Value, culture: &str) -> Value {
        match value {
            Value::Object(map) => Value::Object(Self::project_map(map, culture)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Self::project_value(item, culture))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Culturalizer for Babel {
    fn project(&self, context: &Context, culture: &str) -> Context {
        Context::from(Self::project_map(context.as_map(), culture))
    }
}
