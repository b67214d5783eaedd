use log::{trace, warn};
use serde_extensions::DottedPath;
use serde_json::Value;

use crate::{Context, config::RenderConfig};

/// Prefix marking a reference into global data, `@@global.footer.text`
pub const REFERENCE_PREFIX: &str = "@@";

/// Rewrites internal references in a context, in place
pub trait CrossReferenceResolver: Send + Sync {
    fn resolve(&self, context: &mut Context, config: &RenderConfig);
}

/// Replaces `@@<dotted.path>` strings with the global data found at that path.
/// The leading `global.` segment is optional.
#[derive(Debug, Clone, Default)]
pub struct Globalizer;

impl Globalizer {
    pub fn new() -> Globalizer {
        Globalizer
    }

    fn lookup<'g>(global_data: &'g Value, reference: &str) -> Option<&'g Value> {
        global_data.dotted(reference).or_else(|| {
            reference
                .strip_prefix("global.")
                .and_then(|rest| global_data.dotted(rest))
        })
    }

    fn globalize(value: &mut Value, global_data: &Value) {
        match value {
            Value::String(s) => {
                let Some(reference) = s.strip_prefix(REFERENCE_PREFIX) else {
                    return;
                };
                match Self::lookup(global_data, reference) {
                    Some(resolved) => {
                        trace!("Resolved reference {s}");
                        *value = resolved.clone();
                    }
                    None => warn!("Unresolved reference '{s}'"),
                }
            }
            Value::Array(items) => {
                for item in items {
                    Self::globalize(item, global_data)
                }
            }
            Value::Object(map) => {
                for item in map.values_mut() {
                    Self::globalize(item, global_data)
                }
            }
            _ => {}
        }
    }
}

impl CrossReferenceResolver for Globalizer {
    fn resolve(&self, context: &mut Context, config: &RenderConfig) {
        let Some(global_data) = &config.global_data else {
            return;
        };
        for value in context.as_map_mut().values_mut() {
            Self::globalize(value, global_data);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> RenderConfig {
        RenderConfig::default().with_global_data(json!({
            "contact": { "email": "hi@example.com", "links": ["/a", "/b"] }
        }))
    }

    #[test]
    fn resolves_references_in_place() {
        let mut context = Context::from_value(json!({
            "email": "@@global.contact.email",
            "nested": [{ "href": "@@contact.links.1" }],
            "plain": "no reference"
        }))
        .unwrap();
        Globalizer::new().resolve(&mut context, &config());
        assert_eq!(
            context.into_value(),
            json!({
                "email": "hi@example.com",
                "nested": [{ "href": "/b" }],
                "plain": "no reference"
            })
        );
    }

    #[test]
    fn unresolved_references_stay() {
        let mut context = Context::from_value(json!({"x": "@@global.nope"})).unwrap();
        Globalizer::new().resolve(&mut context, &config());
        assert_eq!(context.get("x"), Some(&json!("@@global.nope")));
    }

    #[test]
    fn noop_without_global_data() {
        let mut context = Context::from_value(json!({"x": "@@contact.email"})).unwrap();
        Globalizer::new().resolve(&mut context, &RenderConfig::default());
        assert_eq!(context.get("x"), Some(&json!("@@contact.email")));
    }
}
