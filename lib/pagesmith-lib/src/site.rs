use futures::{StreamExt, stream};
use log::{error, info};

use crate::{ContentIdentifier, PageRenderer, RenderError, path_extension::PathExtension};

/// A page that could not be rendered during a site build
#[derive(Debug)]
pub struct PageFailure {
    pub identifier: ContentIdentifier,
    pub culture: String,
    pub error: RenderError,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub rendered: usize,
    pub failed: Vec<PageFailure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives every content entry of a project through the renderer, once per culture
pub struct Site {
    renderer: PageRenderer,
}

impl Site {
    pub fn new(renderer: PageRenderer) -> Site {
        Site { renderer }
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    /// Remove and recreate the build folder
    pub async fn clean(&self) -> Result<(), RenderError> {
        let build_root = self.renderer.config().build_root();
        if tokio::fs::try_exists(&build_root).await? {
            info!("Removing {:?}", build_root.canonicalize_nonexistent_path());
            tokio::fs::remove_dir_all(&build_root).await?;
        }
        info!("Creating {:?}", build_root.canonicalize_nonexistent_path());
        tokio::fs::create_dir_all(&build_root).await?;
        Ok(())
    }

    /// Render all pages with at most `jobs` renders in flight. A failing page is recorded in
    /// the report, only failing to list the content aborts the build.
    pub async fn build(&self, jobs: usize) -> Result<BuildReport, RenderError> {
        let identifiers = self.renderer.loader().list().await?;
        let cultures = &self.renderer.config().cultures;
        info!(
            "Rendering {} pages in {} cultures",
            identifiers.len(),
            cultures.len()
        );

        let renders = identifiers.iter().flat_map(move |identifier| {
            cultures
                .iter()
                .map(move |culture| self.render_page(identifier, culture))
        });
        let results: Vec<Result<(), PageFailure>> = stream::iter(renders)
            .buffer_unordered(jobs.max(1))
            .collect()
            .await;

        let mut report = BuildReport::default();
        for result in results {
            match result {
                Ok(()) => report.rendered += 1,
                Err(failure) => report.failed.push(failure),
            }
        }
        if report.is_success() {
            info!("All {} pages written", report.rendered);
        } else {
            error!(
                "{} pages written, {} failed",
                report.rendered,
                report.failed.len()
            );
        }
        Ok(report)
    }

    async fn render_page(
        &self,
        identifier: &ContentIdentifier,
        culture: &str,
    ) -> Result<(), PageFailure> {
        let failure = |error: RenderError| PageFailure {
            identifier: identifier.clone(),
            culture: culture.to_owned(),
            error,
        };
        let template = self.renderer.template_path_for(identifier).map_err(failure)?;
        self.renderer
            .render_to_file(&template, identifier, culture, identifier.as_str())
            .await
            .map_err(failure)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{RenderConfig, RenderErrorKind};

    #[tokio::test]
    async fn builds_every_page_in_every_culture() {
        let dir = TempDir::new().unwrap();
        let config = RenderConfig::new(dir.path()).with_cultures(["en", "de"]);
        fs::create_dir_all(config.templates_root().join("generators")).unwrap();
        fs::create_dir_all(config.content_root().join("generators/news")).unwrap();
        fs::write(config.templates_root().join("index.hbs"), "{{ title }}").unwrap();
        fs::write(
            config.templates_root().join("generators/news.hbs"),
            "news: {{ title }}",
        )
        .unwrap();
        fs::write(config.content_root().join("index.toml"), "title = \"Home\"\n").unwrap();
        fs::write(
            config.content_root().join("generators/news/one.toml"),
            "title = \"One\"\n\"title@de\" = \"Eins\"\n",
        )
        .unwrap();
        // no template for this one
        fs::write(config.content_root().join("orphan.toml"), "title = \"x\"\n").unwrap();

        let site = Site::new(PageRenderer::new(config));
        site.clean().await.unwrap();
        let report = site.build(4).await.unwrap();

        assert_eq!(report.rendered, 4);
        assert_eq!(report.failed.len(), 2);
        assert!(report
            .failed
            .iter()
            .all(|f| f.identifier.as_str() == "orphan"
                && f.error.kind() == RenderErrorKind::TemplateRead));

        let build = dir.path().join("_build");
        assert_eq!(fs::read_to_string(build.join("en/index.html")).unwrap(), "Home");
        assert_eq!(
            fs::read_to_string(build.join("de/generators/news/one.html")).unwrap(),
            "news: Eins"
        );
    }
}
