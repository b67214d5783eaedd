use std::path::{Component, Path, PathBuf};

use log::{debug, error, info};

use crate::{RenderError, config::RenderConfig, path_extension::PathExtension};

/// Log target of the events emitted for every written page
pub const RENDER_EVENTS: &str = "render_events";

/// `<culture>/<dest_path>`, rejected when it would leave the culture folder
fn relative_destination(culture: &str, dest_path: &str) -> Result<PathBuf, RenderError> {
    let mut culture_components = Path::new(culture).components();
    if !matches!(
        (culture_components.next(), culture_components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(RenderError::write("culture must be a single folder name").with_context(culture));
    }

    let dest_path = dest_path.trim_start_matches(['/', '\\']);
    let segments: Vec<&str> = dest_path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(RenderError::write("destination path is empty").with_context(dest_path));
    }
    if segments.iter().any(|s| *s == "." || *s == ".." || s.contains(':')) {
        return Err(
            RenderError::write("destination path may not contain relative segments")
                .with_context(dest_path),
        );
    }
    Ok(Path::new(culture).join(segments.join("/")))
}

/// `<build_root>/<culture>/<dest_path>.<output_extension>`
pub fn destination_for(
    config: &RenderConfig,
    culture: &str,
    dest_path: &str,
) -> Result<PathBuf, RenderError> {
    let relative = relative_destination(culture, dest_path)?;
    Ok(config
        .build_root()
        .join(relative)
        .with_appended_extension(&config.output_extension))
}

/// Persist a rendered page below its culture folder.
///
/// The destination directory is created before anything is written. The page is first
/// written next to its destination and then moved into place so a failed write never
/// leaves a partial page behind.
pub async fn write_page(
    config: &RenderConfig,
    culture: &str,
    dest_path: &str,
    output: &str,
) -> Result<PathBuf, RenderError> {
    let relative = relative_destination(culture, dest_path).inspect_err(|e| {
        error!("Refusing to write page '{culture}/{dest_path}': {e}");
    })?;
    let destination = config
        .build_root()
        .join(&relative)
        .with_appended_extension(&config.output_extension);

    if let Some(directory) = destination.parent() {
        tokio::fs::create_dir_all(directory).await.map_err(|e| {
            error!("Failed to create {directory:?}: {e}");
            RenderError::write(e.to_string()).with_context(format!("{directory:?}"))
        })?;
    }

    let staging = destination.with_appended_extension("tmp");
    debug!("Writing to {:?}", staging.canonicalize_nonexistent_path());
    let written = match tokio::fs::write(&staging, output).await {
        Ok(()) => tokio::fs::rename(&staging, &destination).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        error!("Failed to write page {relative:?}: {e}");
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(RenderError::write(e.to_string()).with_context(format!("{destination:?}")));
    }

    info!(target: RENDER_EVENTS, "page {} created", relative.display());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::RenderErrorKind;

    #[tokio::test]
    async fn writes_below_culture_folder() {
        let dir = TempDir::new().unwrap();
        let config = RenderConfig::new(dir.path());

        let path = write_page(&config, "fr", "about", "<p>salut</p>").await.unwrap();

        assert_eq!(path, dir.path().join("_build/fr/about.html"));
        assert!(dir.path().join("_build/fr").is_dir());
        assert_eq!(fs::read_to_string(path).unwrap(), "<p>salut</p>");
        assert!(!dir.path().join("_build/fr/about.html.tmp").exists());
    }

    #[tokio::test]
    async fn failed_directory_creation_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        // a file where the culture folder should be
        fs::create_dir_all(dir.path().join("_build")).unwrap();
        fs::write(dir.path().join("_build/en"), "").unwrap();
        let config = RenderConfig::new(dir.path());

        let error = write_page(&config, "en", "index", "x").await.unwrap_err();
        assert_eq!(error.kind(), RenderErrorKind::Write);
    }

    #[tokio::test]
    async fn destination_stays_below_culture_folder() {
        let dir = TempDir::new().unwrap();
        let config = RenderConfig::new(dir.path().join("site"));

        for (culture, dest) in [
            ("..", "../escaped"),
            ("en", "../escaped"),
            ("en", "blog/../../escaped"),
            ("en/..", "index"),
            ("", "index"),
            ("en", "/"),
        ] {
            let error = write_page(&config, culture, dest, "x").await.unwrap_err();
            assert_eq!(error.kind(), RenderErrorKind::Write, "{culture} {dest}");
        }
        assert!(!dir.path().join("escaped.html").exists());
        assert!(!dir.path().join("site/escaped.html").exists());

        let path = destination_for(&config, "en", "/blog/first").unwrap();
        assert_eq!(path, config.build_root().join("en/blog/first.html"));
    }
}
