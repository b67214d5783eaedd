//! Context layering.
//!
//! Layers are applied in a fixed order, later layers win on conflicting keys:
//!
//! 1. the base context (loaded or handed in by the caller)
//! 2. `_meta.context_path`
//! 3. global data
//! 4. `_meta.pagename` and `_meta.culture`
//! 5. caller overrides
use serde_json::{Value, json};

use super::{Context, META};
use crate::{ContentIdentifier, config::RenderConfig};

/// One overlay of the merge order
#[derive(Debug, Clone)]
pub enum Layer<'a> {
    ContextPath(&'a ContentIdentifier),
    GlobalData(&'a RenderConfig),
    Identity { pagename: &'a str, culture: &'a str },
    Overrides(Value),
}

impl Layer<'_> {
    pub fn apply(self, context: &mut Context) {
        match self {
            Layer::ContextPath(identifier) => {
                context.extend(json!({ META: { "context_path": identifier.as_str() } }))
            }
            Layer::GlobalData(config) => {
                if let Some(global_data) = &config.global_data {
                    context.extend(global_data.clone())
                }
            }
            Layer::Identity { pagename, culture } => {
                context.extend(json!({ META: { "pagename": pagename, "culture": culture } }))
            }
            Layer::Overrides(overrides) => context.extend(overrides),
        }
    }
}

/// Apply `layers` onto `base` in iteration order
pub fn merge_layers<'a>(mut base: Context, layers: impl IntoIterator<Item = Layer<'a>>) -> Context {
    for layer in layers {
        layer.apply(&mut base);
    }
    base
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn layers_apply_in_order() {
        let config = RenderConfig::default().with_global_data(json!({
            "title": "global title",
            "footer": "global footer",
            "_meta": { "culture": "global" }
        }));
        let identifier = ContentIdentifier::new("about");
        let base = Context::from_value(json!({"title": "About", "body": "hello"})).unwrap();

        let merged = merge_layers(
            base,
            [
                Layer::ContextPath(&identifier),
                Layer::GlobalData(&config),
                Layer::Identity { pagename: "about", culture: "fr" },
                Layer::Overrides(json!({"footer": "override"})),
            ],
        );

        assert_eq!(
            merged.into_value(),
            json!({
                "title": "global title",
                "body": "hello",
                "footer": "override",
                "_meta": { "context_path": "about", "pagename": "about", "culture": "fr" }
            })
        );
    }

    #[test]
    fn overrides_may_target_meta() {
        let merged = merge_layers(
            Context::new(),
            [
                Layer::Identity { pagename: "index", culture: "en" },
                Layer::Overrides(json!({"_meta": {"pagename": "home"}})),
            ],
        );
        assert_eq!(merged.meta("pagename"), Some("home"));
        assert_eq!(merged.meta("culture"), Some("en"));
    }

    #[test]
    fn missing_global_data_is_skipped() {
        let config = RenderConfig::default();
        let base = Context::from_value(json!({"a": 1})).unwrap();
        let merged = merge_layers(base.clone(), [Layer::GlobalData(&config)]);
        assert_eq!(merged, base);
    }
}
