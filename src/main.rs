use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use pagesmith_lib::{
    ContentIdentifier, PageRenderer, RenderConfig, RenderError, Site,
    context::{Layer, merge_layers},
};

mod preview;
mod watch;

#[derive(Parser, Debug)]
#[command(
    author = "Lyr",
    version,
    about = "Pagesmith - culture aware page renderer",
    long_about = "Render templates against layered, localized content into a static site"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// "TRACE", "DEBUG", "INFO", "WARN", "ERROR"
    #[clap(long, short, global = true)]
    log: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every page in every culture into the build folder
    Build {
        /// project root containing pagesmith.toml, the templates and the content
        #[clap(default_value = ".")]
        project: PathBuf,

        /// maximum amount of pages rendered at once
        #[clap(long, short, default_value_t = 8)]
        jobs: usize,

        /// keep files already in the build folder
        #[clap(long)]
        no_clean: bool,

        /// write templates without rendering them
        #[clap(long)]
        raw: bool,
    },
    /// Print a single rendered page
    Page {
        /// content identifier, eg. blog/first-post
        identifier: String,

        #[clap(default_value = ".")]
        project: PathBuf,

        /// culture to render in, defaults to the primary culture
        #[clap(long, short)]
        culture: Option<String>,

        /// print the template without rendering it
        #[clap(long)]
        raw: bool,
    },
    /// Build the site and rebuild whenever content or templates change
    Watch {
        #[clap(default_value = ".")]
        project: PathBuf,

        #[clap(long, short, default_value_t = 8)]
        jobs: usize,

        /// serve the build folder on this port
        #[clap(long, short)]
        port: Option<u16>,
    },
}

fn load_config(project: &Path, raw: bool) -> Result<RenderConfig, RenderError> {
    let config = RenderConfig::from_project(project)?;
    Ok(if raw {
        config.with_render_templates(false)
    } else {
        config
    })
}

async fn build(project: &Path, jobs: usize, no_clean: bool, raw: bool) -> Result<ExitCode, RenderError> {
    let site = Site::new(PageRenderer::new(load_config(project, raw)?));
    if !no_clean {
        site.clean().await?;
    }
    let report = site.build(jobs).await?;
    for failure in &report.failed {
        error!(
            "{} ({}): {}",
            failure.identifier, failure.culture, failure.error
        );
    }
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn page(
    identifier: &str,
    project: &Path,
    culture: Option<&str>,
    raw: bool,
) -> Result<ExitCode, RenderError> {
    let renderer = PageRenderer::new(load_config(project, raw)?);
    let identifier = ContentIdentifier::new(identifier);
    let context = renderer.loader().load(&identifier).await?;
    let context = merge_layers(context, [Layer::ContextPath(&identifier)]);
    let html = renderer
        .render_by_identifier_replace(&identifier, Some(context), culture)
        .await?;
    println!("{html}");
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Args = Args::parse();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = args.log {
        logger.filter_level(level);
    }
    logger.init();

    let result = match args.command {
        Command::Build {
            project,
            jobs,
            no_clean,
            raw,
        } => build(&project, jobs, no_clean, raw).await,
        Command::Page {
            identifier,
            project,
            culture,
            raw,
        } => page(&identifier, &project, culture.as_deref(), raw).await,
        Command::Watch {
            project,
            jobs,
            port,
        } => watch::watch_and_rebuild(&project, jobs, port)
            .await
            .map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
