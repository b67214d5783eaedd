use async_trait::async_trait;
use pulldown_cmark::{Options, Parser, html::push_html};
use serde_json::Value;

use crate::Context;

/// Key suffix marking a field as markdown, `body_md`
pub const MARKDOWN_SUFFIX: &str = "_md";

/// Replaces markup bearing fields of a context with their rendered form
#[async_trait]
pub trait MarkupTransform: Send + Sync {
    async fn transform(&self, context: &mut Context);
}

/// Render markdown to html with tables, strikethrough and task lists enabled
pub fn render_markdown(content: &str) -> String {
    let options =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(content, options);
    let mut html = String::with_capacity(content.len() * 2);
    push_html(&mut html, parser);
    html
}

/// Renders every string stored under a key ending with `_md`.
///
/// Localized variants (`body_md@fr`) are recognised by the part before the culture.
#[derive(Debug, Clone, Default)]
pub struct Markdownifier;

impl Markdownifier {
    pub fn new() -> Markdownifier {
        Markdownifier
    }

    fn is_markdown_key(key: &str) -> bool {
        let base = key.split_once('@').map(|(base, _)| base).unwrap_or(key);
        base.ends_with(MARKDOWN_SUFFIX)
    }

    fn markdownify(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, item) in map.iter_mut() {
                    match item {
                        Value::String(s) if Self::is_markdown_key(key) => {
                            *s = render_markdown(s);
                        }
                        _ => Self::markdownify(item),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(Self::markdownify),
            _ => {}
        }
    }
}

#[async_trait]
impl MarkupTransform for Markdownifier {
    async fn transform(&self, context: &mut Context) {
        for (key, item) in context.as_map_mut().iter_mut() {
            match item {
                Value::String(s) if Self::is_markdown_key(key) => *s = render_markdown(s),
                _ => Self::markdownify(item),
            }
        }
    }
}
