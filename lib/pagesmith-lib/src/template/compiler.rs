use std::path::Path;

use log::{debug, error};
use regex::Regex;

use super::{Template, TemplateEngine};
use crate::{RenderError, config::RenderConfig};

/// A template read from disk and compiled for a single render
pub struct CompiledPage {
    pub template: Box<dyn Template>,
    /// Unrendered template source, written out as is when templates are not rendered
    pub source: String,
    /// File name of the template without extension
    pub pagename: String,
    /// Template path relative to the templates folder, used to label errors
    pub filename: String,
}

/// Final path segment without its extension
pub fn pagename_from_location(location: &str) -> Result<String, RenderError> {
    let re = Regex::new(r"([^/\\]*)\.[^.]*$")?;
    re.captures(location)
        .map(|c| c[1].to_owned())
        .ok_or(RenderError::resolution(format!("'{location}' does not name a template file")))
}

/// Path below the templates root without its extension, `<root>/pages/blog/post.hbs` gives
/// `blog/post`. `None` when the template lives outside the templates root.
pub fn filename_from_location(location: &Path, config: &RenderConfig) -> Option<String> {
    let relative = location.strip_prefix(config.templates_root()).ok()?;
    let relative = relative.with_extension("");
    let filename = relative.to_string_lossy().replace('\\', "/");
    (!filename.is_empty()).then_some(filename)
}

/// Read the template at `location` and compile it
pub async fn compile_template(
    location: &Path,
    engine: &dyn TemplateEngine,
    config: &RenderConfig,
) -> Result<CompiledPage, RenderError> {
    let location_str = location.to_string_lossy();
    let pagename = pagename_from_location(&location_str)?;
    let filename = filename_from_location(location, config).unwrap_or(pagename.clone());

    let source = match tokio::fs::read_to_string(location).await {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to read template {location:?} for page '{filename}': {e}");
            return Err(RenderError::template_read(e.to_string()).with_context(location_str));
        }
    };
    debug!("Compiling template {location:?}");

    let name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(pagename.clone());
    let template = engine.compile(&name, &source);

    Ok(CompiledPage {
        template,
        source,
        pagename,
        filename,
    })
}
