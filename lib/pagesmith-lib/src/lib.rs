//! Page rendering pipeline for static sites
//!
//! Given a template, a context and a culture this crate produces a finished page and writes
//! it to the build folder. It resolves the template belonging to a content entry, layers
//! stored content, global data and page metadata into one context, resolves `@@` references,
//! renders markdown fields, localizes the context and invokes the template. A page whose
//! template fails is replaced by [`ERROR_OUTPUT`] instead of failing the whole build.
//!
//! # Examples on how to use this crate
//! ```rs
//! let config = RenderConfig::from_project(Path::new("./my_site"))?;
//! let renderer = PageRenderer::new(config);
//! // Render a single page to a string
//! let html = renderer.render_by_identifier_extend(&"about".into(), None).await?;
//! // Or render every page in every culture to the build folder
//! let site = Site::new(renderer);
//! let report = site.build(8).await?;
//! ```
pub mod config;
pub mod context;
pub mod culture;
pub mod identifier;
pub mod render_error;
pub mod renderer;
pub mod site;
pub mod template;
pub mod transform;
pub mod writer;

mod path_extension;

pub use config::RenderConfig;
pub use context::{Context, ContextLoader, FlatLoader};
pub use identifier::{ContentIdentifier, template_path_for};
pub use render_error::{RenderError, RenderErrorKind};
pub use renderer::{ERROR_OUTPUT, PageRenderer};
pub use site::{BuildReport, PageFailure, Site};
pub use template::{MiniJinjaEngine, Template, TemplateEngine};
