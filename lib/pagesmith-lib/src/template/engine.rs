//! Templating engine boundary.
//!
//! The pipeline only needs two things from an engine: turn source text into something
//! invocable, and invoke it against a context. [`MiniJinjaEngine`] is the default backend.

use minijinja::{AutoEscape, Environment};
use serde_json::Value;

use crate::RenderError;

/// Compiles template source into an invocable [`Template`]
pub trait TemplateEngine: Send + Sync {
    /// Compilation itself never fails, syntax errors surface when the template is invoked
    fn compile(&self, name: &str, source: &str) -> Box<dyn Template>;
}

pub trait Template: Send {
    fn invoke(&self, context: &Value) -> Result<String, RenderError>;
}

/// Jinja2 style templates, `{{ title }}` interpolation with html auto escaping
#[derive(Debug, Clone)]
pub struct MiniJinjaEngine {
    escaped_extensions: Vec<String>,
}

impl MiniJinjaEngine {
    pub fn new() -> MiniJinjaEngine {
        MiniJinjaEngine {
            escaped_extensions: vec!["hbs".into(), "html".into(), "htm".into()],
        }
    }

    /// Templates whose name ends with one of these extensions get html escaping
    pub fn with_escaped_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.escaped_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn compile(&self, name: &str, source: &str) -> Box<dyn Template> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        let escaped = self.escaped_extensions.clone();
        env.set_auto_escape_callback(move |name| {
            let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
            if escaped.iter().any(|e| e == extension) {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });

        let compile_error = env
            .add_template_owned(name.to_owned(), source.to_owned())
            .err()
            .map(|e| RenderError::from(e).with_context(name));

        Box::new(MiniJinjaTemplate {
            env,
            name: name.to_owned(),
            compile_error,
        })
    }
}

struct MiniJinjaTemplate {
    env: Environment<'static>,
    name: String,
    compile_error: Option<RenderError>,
}

impl Template for MiniJinjaTemplate {
    fn invoke(&self, context: &Value) -> Result<String, RenderError> {
        if let Some(error) = &self.compile_error {
            return Err(error.clone());
        }
        let template = self.env.get_template(&self.name)?;
        Ok(template.render(context)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::RenderErrorKind;

    #[test]
    fn renders_variables() {
        let template = MiniJinjaEngine::new().compile("index.hbs", "<h1>{{title}}</h1>");
        let output = template.invoke(&json!({"title": "Hi"})).unwrap();
        assert_eq!(output, "<h1>Hi</h1>");
    }

    #[test]
    fn escapes_html_templates_only() {
        let engine = MiniJinjaEngine::new();
        let data = json!({"body": "<b>"});
        let html = engine.compile("page.hbs", "{{ body }}").invoke(&data).unwrap();
        let text = engine.compile("page.txt", "{{ body }}").invoke(&data).unwrap();
        assert_eq!(html, "&lt;b&gt;");
        assert_eq!(text, "<b>");
    }

    #[test]
    fn syntax_errors_surface_on_invoke() {
        let template = MiniJinjaEngine::new().compile("broken.hbs", "{% for %}");
        let error = template.invoke(&json!({})).unwrap_err();
        assert_eq!(error.kind(), RenderErrorKind::Invocation);
    }
}
