//! clipmix - main entry point
//!
//! Concatenates the clips of one project folder under a music track. This
//! binary handles:
//! - Argument parsing and config overrides
//! - Application-level logging initialization
//! - The terminal progress bar
//! - Running the standard pipeline

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;

use clipmix_core::config::{ConfigManager, ConfigSection};
use clipmix_core::logging::{
    init_tracing, init_tracing_with_file, ConsoleCallback, JobLogger, JobLoggerBuilder, LogConfig,
    LogLevel,
};
use clipmix_core::orchestrator::{create_standard_pipeline, Context, JobState, PipelineError};
use clipmix_core::probe::FfprobeProber;
use clipmix_core::runner::ProcessRunner;

mod progress;

use progress::BarSink;

#[derive(Parser, Debug)]
#[command(name = "clipmix", version, about = "Concatenate a folder of clips under a music track")]
struct Cli {
    /// Config file (created with defaults if missing)
    #[arg(long, default_value = ".config/clipmix.toml")]
    config: PathBuf,

    /// Project folder holding the clips (overrides the config)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Save --project into the config file
    #[arg(long, requires = "project")]
    remember_project: bool,

    /// Output file name (overrides the config)
    #[arg(short, long)]
    output: Option<String>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Debug logging, tool output included
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("[ERROR] {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Run the pipeline.
///
/// Pipeline failures are reported through the run logger and turn into exit
/// code 1 here; `Err` is left for failures before the run logger exists.
fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = ConfigManager::new(&cli.config);
    if let Err(e) = config.load_or_create() {
        eprintln!("[WARNING] Failed to load config: {}. Using defaults.", e);
    }

    // Persist the project before the output override touches [paths]
    if let Some(project) = &cli.project {
        config.settings_mut().paths.project_root = project.to_string_lossy().to_string();
        if cli.remember_project {
            config
                .update_section(ConfigSection::Paths)
                .context("saving project folder to config")?;
        }
    }
    if let Some(output) = &cli.output {
        config.settings_mut().paths.output_file = output.clone();
    }

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let logs_dir = config.settings().logs_folder();
    let _log_guard = match config.ensure_dirs_exist() {
        Ok(()) => Some(init_tracing_with_file(level, &logs_dir)),
        Err(e) => {
            init_tracing(level);
            tracing::error!("Failed to create directories: {}", e);
            None
        }
    };

    tracing::info!("clipmix {} starting", clipmix_core::version());
    tracing::info!("Config: {}", cli.config.display());

    let settings = config.settings().clone();

    let sink = Arc::new(BarSink::new(!cli.no_progress));
    let bar = sink.bar();
    let console: ConsoleCallback = Box::new(move |line: &str| bar.suspend(|| println!("{}", line)));

    let logger = Arc::new(
        JobLoggerBuilder::new("clipmix", &logs_dir)
            .config(LogConfig::from_settings(&settings.logging))
            .level(level)
            .compact(settings.logging.compact && !cli.verbose)
            .console(console)
            .build()
            .with_context(|| format!("creating run log in {}", logs_dir.display()))?,
    );

    let runner = Arc::new(
        ProcessRunner::new(Arc::clone(&logger))
            .with_pretty_commands(settings.logging.show_command_pretty),
    );
    let prober = Arc::new(FfprobeProber::new(&settings.encoding.ffprobe_path));

    let mut ctx = Context::new(settings, "clipmix", Arc::clone(&logger), runner, prober)
        .with_progress_callback(Box::new(|step: &str, percent: u32, message: &str| {
            tracing::debug!("[{}] {}% {}", step, percent, message);
        }));
    if !cli.no_progress {
        ctx = ctx.with_progress_sink(sink);
    }

    let mut state = JobState::new("clipmix");
    let result = create_standard_pipeline().run(&ctx, &mut state);

    let code = match result {
        Ok(result) => {
            tracing::info!(
                "Finished: {} steps completed, {} skipped",
                result.steps_completed.len(),
                result.steps_skipped.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&logger, &e);
            ExitCode::from(1)
        }
    };
    logger.close();
    Ok(code)
}

/// Show a pipeline failure on the console exactly once.
///
/// Step failures were already printed by the pipeline as they happened;
/// only failures before the first step still need a line.
fn report_failure(logger: &JobLogger, err: &PipelineError) {
    tracing::error!("{}", err);
    if err.step_error().is_none() {
        logger.error(&err.to_string());
    }
}
