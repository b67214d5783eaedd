use std::{path::Path, thread, time::Duration};

use log::{debug, error, info};
use notify_debouncer_full::{
    DebounceEventResult, new_debouncer,
    notify::{EventKind, RecursiveMode},
};
use pagesmith_lib::{PageRenderer, RenderError, Site};
use tokio::sync::mpsc;

use crate::{load_config, preview::start_preview_server};

async fn rebuild(project: &Path, jobs: usize) {
    // config is read again so changes to global data are picked up
    let site = match load_config(project, false) {
        Ok(config) => Site::new(PageRenderer::new(config)),
        Err(e) => {
            error!("Failed to read config: {e}");
            return;
        }
    };
    if let Err(e) = site.clean().await {
        error!("Failed to clean build folder: {e}");
        return;
    }
    match site.build(jobs).await {
        Ok(report) if report.is_success() => info!("Build completed successfully"),
        Ok(report) => {
            for failure in report.failed {
                error!(
                    "{} ({}): {}",
                    failure.identifier, failure.culture, failure.error
                );
            }
        }
        Err(e) => error!("Build failed: {e}"),
    }
}

pub async fn watch_and_rebuild(
    project: &Path,
    jobs: usize,
    port: Option<u16>,
) -> Result<(), RenderError> {
    let config = load_config(project, false)?;
    rebuild(project, jobs).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        None,
        move |result: DebounceEventResult| {
            let Ok(events) = result else {
                return;
            };
            // Access events are file reads, only respond to actual modifications
            let modifications: Vec<_> = events
                .iter()
                .filter(|event| !matches!(event.event.kind, EventKind::Access(_)))
                .collect();
            if modifications.is_empty() {
                return;
            }
            for event in modifications {
                debug!("File change detected: {event:?}");
            }
            let _ = tx.send(());
        },
    )
    .map_err(|e| RenderError::io(e.to_string()))?;

    for path in [config.content_root(), config.templates_root()] {
        if path.is_dir() {
            debouncer
                .watch(&path, RecursiveMode::Recursive)
                .map_err(|e| RenderError::io(e.to_string()).with_context(format!("{path:?}")))?;
            info!("Watching {path:?} for changes");
        }
    }

    if let Some(port) = port {
        let build_root = config.build_root();
        let culture = config.primary_culture().to_owned();
        info!("Starting preview server at http://localhost:{port}");
        info!("Serving files from {build_root:?}");
        thread::spawn(move || {
            if let Err(e) = start_preview_server(build_root, culture, port) {
                error!("Preview server stopped: {e}");
            }
        });
    }
    info!("Press Ctrl+C to stop.");

    while rx.recv().await.is_some() {
        info!("Changes detected, rebuilding...");
        rebuild(project, jobs).await;
    }
    Ok(())
}
