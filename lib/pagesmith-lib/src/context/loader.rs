use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error};

use super::{Context, toml_to_json};
use crate::{ContentIdentifier, RenderError, config::RenderConfig};

/// Loads the raw context stored for a content identifier
#[async_trait]
pub trait ContextLoader: Send + Sync {
    async fn load(&self, identifier: &ContentIdentifier) -> Result<Context, RenderError>;

    /// Every identifier this loader can load, used for full site builds
    async fn list(&self) -> Result<Vec<ContentIdentifier>, RenderError> {
        Ok(vec![])
    }
}

/// Content store made out of toml files: `blog/first` lives in `<content_root>/blog/first.toml`
#[derive(Debug, Clone)]
pub struct FlatLoader {
    content_root: PathBuf,
    global_folder: String,
}

impl FlatLoader {
    pub fn new(content_root: impl Into<PathBuf>, global_folder: impl Into<String>) -> FlatLoader {
        FlatLoader {
            content_root: content_root.into(),
            global_folder: global_folder.into(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> FlatLoader {
        FlatLoader::new(config.content_root(), config.global_folder.clone())
    }

    /// `<content_root>/<identifier>.toml`, identifiers may not leave the content root
    pub fn content_path(&self, identifier: &ContentIdentifier) -> Result<PathBuf, RenderError> {
        let segments = identifier.segments();
        let relative = segments.iter().any(|s| *s == "." || *s == ".." || s.contains(':'));
        if segments.is_empty() || relative {
            return Err(RenderError::load("identifier does not name stored content")
                .with_context(identifier.as_str()));
        }
        Ok(self.content_root.join(format!("{}.toml", segments.join("/"))))
    }

    fn identifier_from_path(&self, path: &Path) -> Option<ContentIdentifier> {
        let relative = path.strip_prefix(&self.content_root).ok()?.with_extension("");
        let identifier = ContentIdentifier::new(relative.to_str()?);
        if identifier.segments().first() == Some(&self.global_folder.as_str()) {
            return None;
        }
        Some(identifier)
    }
}

#[async_trait]
impl ContextLoader for FlatLoader {
    async fn load(&self, identifier: &ContentIdentifier) -> Result<Context, RenderError> {
        let path = self.content_path(identifier)?;
        debug!("Loading context {path:?}");
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            RenderError::load(format!("failed to read {path:?}: {e}")).with_context(identifier.as_str())
        })?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| {
            RenderError::load(format!("failed to parse {path:?}: {e}")).with_context(identifier.as_str())
        })?;
        Context::from_value(toml_to_json(toml::Value::Table(table)))
    }

    async fn list(&self) -> Result<Vec<ContentIdentifier>, RenderError> {
        let pattern = self.content_root.join("**").join("*.toml");
        let pattern = pattern
            .to_str()
            .ok_or(RenderError::config(format!("{pattern:?} is non unicode")))?;

        let mut identifiers = vec![];
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) => {
                    if let Some(identifier) = self.identifier_from_path(&path) {
                        identifiers.push(identifier);
                    }
                }
                Err(e) => error!("Failed to read content entry: {e}"),
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }
}
