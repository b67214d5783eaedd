use std::{fmt, path::PathBuf};

use crate::{RenderError, config::RenderConfig, path_extension::PathExtension};

/// Reserved path segment marking generated pages
pub const GENERATORS: &str = "generators";

/// Relative path naming a content entry inside the content store (`blog/first-post`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentIdentifier(String);

impl ContentIdentifier {
    /// Normalizes separators to `/` and strips leading and trailing separators
    pub fn new(identifier: impl AsRef<str>) -> ContentIdentifier {
        let normalized = identifier.as_ref().replace('\\', "/");
        ContentIdentifier(normalized.trim_matches('/').to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Entries below a `generators` segment share the template of their generator
    pub fn is_generated(&self) -> bool {
        self.segments().contains(&GENERATORS)
    }
}

impl fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentIdentifier {
    fn from(value: &str) -> Self {
        ContentIdentifier::new(value)
    }
}

impl From<String> for ContentIdentifier {
    fn from(value: String) -> Self {
        ContentIdentifier::new(value)
    }
}

/// Map a content identifier to the absolute location of its template.
///
/// Plain identifiers map 1:1 onto `<templates_root>/<identifier>.<ext>`. Generated
/// entries drop their instance name, and a `generators` segment left dangling at the
/// end is dropped with it, so `a/b/generators/c` uses the template of `a/b` while
/// `generators/blog/post` uses `generators/blog`. No I/O happens here.
pub fn template_path_for(
    identifier: &ContentIdentifier,
    config: &RenderConfig,
) -> Result<PathBuf, RenderError> {
    let mut segments = identifier.segments();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(RenderError::resolution("identifier may not contain relative segments")
            .with_context(identifier.as_str()));
    }

    if identifier.is_generated() {
        segments.pop();
        if segments.last() == Some(&GENERATORS) {
            segments.pop();
        }
    }

    if segments.is_empty() {
        return Err(RenderError::resolution("identifier does not name a template")
            .with_context(identifier.as_str()));
    }

    Ok(config
        .templates_root()
        .join(segments.join("/"))
        .with_appended_extension(&config.template_extension))
}
