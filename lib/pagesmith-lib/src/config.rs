//! Site configuration consumed by the render pipeline.
//!
//! The configuration is an explicit, read-only value. It is built once (usually from
//! `pagesmith.toml` in the project root) and shared between renders behind an `Arc`.
//!
//! ```toml
//! cultures = ["en", "fr"]
//! build_folder = "_build"
//! render_templates = true
//! ```
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{RenderError, context::toml_to_json, path_extension::PathExtension};

pub const CONFIG_FILE: &str = "pagesmith.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Project root, every other folder is relative to it
    #[serde(skip)]
    pub project_path: PathBuf,
    /// Supported cultures, the first one is the primary culture
    pub cultures: Vec<String>,
    pub build_folder: PathBuf,
    /// When false templates are written out without being invoked
    pub render_templates: bool,
    pub templates_folder: PathBuf,
    pub template_extension: String,
    pub output_extension: String,
    pub content_folder: PathBuf,
    /// Folder inside the content folder holding global data
    pub global_folder: String,
    /// Data visible to every page
    #[serde(skip)]
    pub global_data: Option<Value>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            project_path: PathBuf::from("."),
            cultures: vec!["en".into()],
            build_folder: PathBuf::from("_build"),
            render_templates: true,
            templates_folder: PathBuf::from("pages"),
            template_extension: "hbs".into(),
            output_extension: "html".into(),
            content_folder: PathBuf::from("cms"),
            global_folder: "global".into(),
            global_data: None,
        }
    }
}

impl RenderConfig {
    pub fn new(project_path: impl Into<PathBuf>) -> RenderConfig {
        RenderConfig {
            project_path: project_path.into(),
            ..Default::default()
        }
    }

    /// Read `pagesmith.toml` and the global data folder of a project
    pub fn from_project(project_path: &Path) -> Result<RenderConfig, RenderError> {
        let config_path = project_path.join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            info!("Reading config {:?}", config_path.canonicalize_nonexistent_path());
            let content = fs::read_to_string(&config_path)?;
            toml::from_str::<RenderConfig>(&content)
                .map_err(|e| RenderError::config(e.to_string()).with_context(CONFIG_FILE))?
        } else {
            debug!("No {CONFIG_FILE} found, using defaults");
            RenderConfig::default()
        };
        config.project_path = project_path.to_path_buf();
        config.global_data = config.read_global_data()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cultures<S: Into<String>>(mut self, cultures: impl IntoIterator<Item = S>) -> Self {
        self.cultures = cultures.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_global_data(mut self, global_data: Value) -> Self {
        self.global_data = Some(global_data);
        self
    }

    pub fn with_render_templates(mut self, render_templates: bool) -> Self {
        self.render_templates = render_templates;
        self
    }

    pub fn with_build_folder(mut self, build_folder: impl Into<PathBuf>) -> Self {
        self.build_folder = build_folder.into();
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.cultures.is_empty() {
            return Err(RenderError::config("at least one culture must be configured"));
        }
        let mut seen = HashSet::new();
        for culture in &self.cultures {
            if culture.is_empty() {
                return Err(RenderError::config("culture names can't be empty"));
            }
            if !seen.insert(culture) {
                return Err(RenderError::config(format!("culture '{culture}' is listed twice")));
            }
        }
        Ok(())
    }

    /// The default culture. `validate` guarantees there is one.
    pub fn primary_culture(&self) -> &str {
        self.cultures.first().map(String::as_str).unwrap_or("en")
    }

    pub fn supports_culture(&self, culture: &str) -> bool {
        self.cultures.iter().any(|c| c == culture)
    }

    pub fn templates_root(&self) -> PathBuf {
        self.project_path.join(&self.templates_folder)
    }

    pub fn build_root(&self) -> PathBuf {
        self.project_path.join(&self.build_folder)
    }

    pub fn content_root(&self) -> PathBuf {
        self.project_path.join(&self.content_folder)
    }

    pub fn global_root(&self) -> PathBuf {
        self.content_root().join(&self.global_folder)
    }

    /// Every `*.toml` file in the global folder becomes a key named after its file stem
    fn read_global_data(&self) -> Result<Option<Value>, RenderError> {
        let global_root = self.global_root();
        if !global_root.is_dir() {
            return Ok(None);
        }

        let mut global = Map::new();
        let mut entries: Vec<PathBuf> = fs::read_dir(&global_root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        entries.sort();
        for path in entries {
            let name = path.filestem_from_path()?;
            let content = fs::read_to_string(&path)?;
            let table: toml::Table = toml::from_str(&content)
                .map_err(|e| RenderError::config(e.to_string()).with_context(format!("{path:?}")))?;
            debug!("Loaded global data '{name}'");
            global.insert(name, toml_to_json(toml::Value::Table(table)));
        }
        Ok(Some(Value::Object(global)))
    }
}
