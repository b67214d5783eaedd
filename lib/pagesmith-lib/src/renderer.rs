use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, error, warn};
use serde_json::Value;

use crate::{
    ContentIdentifier, Context, RenderError,
    config::RenderConfig,
    context::{ContextLoader, FlatLoader, Layer, merge_layers},
    culture::{Babel, Culturalizer},
    identifier::template_path_for,
    template::{MiniJinjaEngine, Template, TemplateEngine, compile_template},
    transform::{CrossReferenceResolver, Globalizer, Markdownifier, MarkupTransform},
    writer::write_page,
};

/// Output substituted for a page whose template failed while being invoked
pub const ERROR_OUTPUT: &str = "Error processing page";

/// Renders single pages: loads and layers their context, runs the transforms, invokes the
/// template in the requested culture and optionally writes the result to the build folder.
///
/// Every render works on its own context and its own compiled template, the renderer only
/// shares read-only configuration, so any number of renders can be in flight at once.
#[derive(Clone)]
pub struct PageRenderer {
    config: Arc<RenderConfig>,
    loader: Arc<dyn ContextLoader>,
    engine: Arc<dyn TemplateEngine>,
    globalizer: Arc<dyn CrossReferenceResolver>,
    markup: Arc<dyn MarkupTransform>,
    culturalizer: Arc<dyn Culturalizer>,
}

impl PageRenderer {
    /// Renderer with the default collaborators: toml content store, minijinja templates,
    /// `@@` reference resolution, `_md` markdown fields and `@culture` localization
    pub fn new(config: RenderConfig) -> PageRenderer {
        let loader = FlatLoader::from_config(&config);
        PageRenderer {
            config: Arc::new(config),
            loader: Arc::new(loader),
            engine: Arc::new(MiniJinjaEngine::new()),
            globalizer: Arc::new(Globalizer::new()),
            markup: Arc::new(Markdownifier::new()),
            culturalizer: Arc::new(Babel::new()),
        }
    }

    pub fn with_loader(mut self, loader: impl ContextLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn with_globalizer(mut self, globalizer: impl CrossReferenceResolver + 'static) -> Self {
        self.globalizer = Arc::new(globalizer);
        self
    }

    pub fn with_markup(mut self, markup: impl MarkupTransform + 'static) -> Self {
        self.markup = Arc::new(markup);
        self
    }

    pub fn with_culturalizer(mut self, culturalizer: impl Culturalizer + 'static) -> Self {
        self.culturalizer = Arc::new(culturalizer);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn loader(&self) -> &dyn ContextLoader {
        self.loader.as_ref()
    }

    pub fn template_path_for(&self, identifier: &ContentIdentifier) -> Result<PathBuf, RenderError> {
        template_path_for(identifier, &self.config).inspect_err(|e| {
            error!("Failed to find a template for '{identifier}': {e}")
        })
    }

    /// Load the context of `identifier`, render it with `template` and write it to
    /// `<build>/<culture>/<dest_path>.<ext>`. Only configured cultures are written.
    pub async fn render_to_file(
        &self,
        template: &Path,
        identifier: &ContentIdentifier,
        culture: &str,
        dest_path: &str,
    ) -> Result<(), RenderError> {
        if !self.config.supports_culture(culture) {
            error!(
                "Refusing to write '{identifier}' for culture '{culture}', not one of {:?}",
                self.config.cultures
            );
            return Err(RenderError::write(format!("culture '{culture}' is not configured"))
                .with_context(identifier.as_str()));
        }
        let context = self.load(identifier, template).await?;
        let context = merge_layers(context, [Layer::ContextPath(identifier)]);

        let output = self.render_layered(template, context, culture, None).await?;
        write_page(&self.config, culture, dest_path, &output).await?;
        Ok(())
    }

    /// Render `template` against a caller supplied context, nothing is written
    pub async fn render_context(
        &self,
        template: &Path,
        context: Context,
        culture: &str,
    ) -> Result<String, RenderError> {
        self.render_layered(template, context, culture, None).await
    }

    /// Render the stored context of `identifier` in the primary culture, with `extra`
    /// layered on top of everything else
    pub async fn render_by_identifier_extend(
        &self,
        identifier: &ContentIdentifier,
        extra: Option<Value>,
    ) -> Result<String, RenderError> {
        let template = self.template_path_for(identifier)?;
        let context = self.load(identifier, &template).await?;
        let context = merge_layers(context, [Layer::ContextPath(identifier)]);

        let culture = self.config.primary_culture().to_owned();
        self.render_layered(&template, context, &culture, extra).await
    }

    /// Render the template of `identifier` with the given context as is, nothing is loaded.
    /// Without a culture the primary culture is used.
    pub async fn render_by_identifier_replace(
        &self,
        identifier: &ContentIdentifier,
        context: Option<Context>,
        culture: Option<&str>,
    ) -> Result<String, RenderError> {
        let template = self.template_path_for(identifier)?;
        let culture = culture.unwrap_or(self.config.primary_culture());
        self.render_context(&template, context.unwrap_or_default(), culture)
            .await
    }

    async fn load(
        &self,
        identifier: &ContentIdentifier,
        template: &Path,
    ) -> Result<Context, RenderError> {
        self.loader.load(identifier).await.inspect_err(|e| {
            error!("Failed to load context '{identifier}' for template {template:?}: {e}")
        })
    }

    async fn render_layered(
        &self,
        template: &Path,
        context: Context,
        culture: &str,
        overrides: Option<Value>,
    ) -> Result<String, RenderError> {
        if !self.config.supports_culture(culture) {
            warn!("Culture '{culture}' is not one of {:?}", self.config.cultures);
        }

        let page = compile_template(template, self.engine.as_ref(), &self.config).await?;

        let mut layers = vec![
            Layer::GlobalData(&self.config),
            Layer::Identity {
                pagename: &page.pagename,
                culture,
            },
        ];
        if let Some(overrides) = overrides {
            layers.push(Layer::Overrides(overrides));
        }
        let mut context = merge_layers(context, layers);

        self.globalizer.resolve(&mut context, &self.config);
        self.markup.transform(&mut context).await;

        if !self.config.render_templates {
            debug!("Skipping invocation of '{}'", page.filename);
            return Ok(page.source);
        }

        let view = self.culturalizer.project(&context, culture);
        Ok(invoke(page.template.as_ref(), view, &page.filename))
    }
}

/// Invoke a template, a failure is logged and replaced by [`ERROR_OUTPUT`]
fn invoke(template: &dyn Template, view: Context, filename: &str) -> String {
    match template.invoke(&view.into_value()) {
        Ok(output) => output,
        Err(e) => {
            error!("Page: {filename}\n{}", e.message());
            ERROR_OUTPUT.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::RenderErrorKind;

    fn project() -> (TempDir, RenderConfig) {
        let dir = TempDir::new().unwrap();
        let config = RenderConfig::new(dir.path()).with_cultures(["en", "fr"]);
        fs::create_dir_all(config.templates_root()).unwrap();
        fs::create_dir_all(config.content_root()).unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn renders_caller_context() {
        let (_dir, config) = project();
        let template = config.templates_root().join("index.hbs");
        fs::write(&template, "<h1>{{title}}</h1>").unwrap();
        let renderer = PageRenderer::new(config);

        let context = Context::from_value(json!({"title": "Hi"})).unwrap();
        let output = renderer.render_context(&template, context, "en").await.unwrap();
        assert_eq!(output, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn extend_overrides_global_data() {
        let (_dir, config) = project();
        let config = config.with_global_data(json!({"title": "global"}));
        fs::write(config.templates_root().join("about.hbs"), "{{ title }}|{{ _meta.context_path }}")
            .unwrap();
        fs::write(config.content_root().join("about.toml"), "title = \"About\"\n").unwrap();
        let renderer = PageRenderer::new(config);

        let plain = renderer
            .render_by_identifier_extend(&"about".into(), None)
            .await
            .unwrap();
        assert_eq!(plain, "global|about");

        let extended = renderer
            .render_by_identifier_extend(&"about".into(), Some(json!({"title": "mine"})))
            .await
            .unwrap();
        assert_eq!(extended, "mine|about");
    }

    #[tokio::test]
    async fn replace_uses_context_as_is() {
        let (_dir, config) = project();
        fs::write(config.templates_root().join("about.hbs"), "{{ title }}/{{ _meta.culture }}")
            .unwrap();
        fs::write(config.content_root().join("about.toml"), "title = \"stored\"\n").unwrap();
        let renderer = PageRenderer::new(config);

        let context = Context::from_value(json!({"title": "given", "title@fr": "donné"})).unwrap();
        let output = renderer
            .render_by_identifier_replace(&"about".into(), Some(context.clone()), Some("fr"))
            .await
            .unwrap();
        assert_eq!(output, "donné/fr");

        let output = renderer
            .render_by_identifier_replace(&"about".into(), Some(context), None)
            .await
            .unwrap();
        assert_eq!(output, "given/en");
    }

    #[tokio::test]
    async fn load_failure_rejects_without_writing() {
        let (dir, config) = project();
        let template = config.templates_root().join("ghost.hbs");
        fs::write(&template, "boo").unwrap();
        let renderer = PageRenderer::new(config);

        let error = renderer
            .render_to_file(&template, &"ghost".into(), "en", "ghost")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), RenderErrorKind::Load);
        assert!(!dir.path().join("_build").exists());
    }

    #[tokio::test]
    async fn unconfigured_culture_is_not_written() {
        let (dir, config) = project();
        let template = config.templates_root().join("index.hbs");
        fs::write(&template, "{{ title }}").unwrap();
        fs::write(config.content_root().join("index.toml"), "title = \"x\"\n").unwrap();
        let renderer = PageRenderer::new(config);

        for culture in ["..", "xx", "en"] {
            let error = renderer
                .render_to_file(&template, &"index".into(), culture, "../escaped")
                .await
                .unwrap_err();
            assert_eq!(error.kind(), RenderErrorKind::Write);
        }
        assert!(!dir.path().join("_build").exists());
        assert!(!dir.path().join("escaped.html").exists());
    }

    #[tokio::test]
    async fn markdown_runs_after_globalization() {
        let (_dir, config) = project();
        let config = config.with_global_data(json!({"intro": "**global**"}));
        let template = config.templates_root().join("index.hbs");
        fs::write(&template, "{{ intro_md|safe }}").unwrap();
        let renderer = PageRenderer::new(config);

        let context = Context::from_value(json!({"intro_md": "@@global.intro"})).unwrap();
        let output = renderer.render_context(&template, context, "en").await.unwrap();
        assert_eq!(output, "<p><strong>global</strong></p>\n");
    }
}
