//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{Config, ConfigError};
use crate::discovery::{Discovery, SourceFile, COMPONENT_EXTENSIONS};
use crate::output::{FileReport, FileStatus, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use react_transformer::{
    normalize_path, transform, Diagnostic, DiagnosticCode, TransformError,
};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use thiserror::Error;

/// Quiet period after the last change before a watch rerun.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Watch error.
    #[error("watch error: {0}")]
    WatchFailed(String),

    /// The working directory is unavailable or not UTF-8.
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(String),
}

/// Runs the conversion, once or in watch mode.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    let cwd = std::env::current_dir()
        .map_err(|e| OrchestratorError::CurrentDir(e.to_string()))
        .and_then(|p| {
            Utf8PathBuf::try_from(p).map_err(|e| OrchestratorError::CurrentDir(e.to_string()))
        })?;
    let orchestrator = Orchestrator::new(args, &cwd)?;

    if args.watch {
        orchestrator.watch()
    } else {
        let (reports, summary) = orchestrator.run_once();
        print!("{}", orchestrator.formatter.format(&reports, &summary));
        Ok(summary)
    }
}

/// Resolved run settings.
pub struct Orchestrator {
    config: Config,
    output_dir: Utf8PathBuf,
    paths: Vec<Utf8PathBuf>,
    discovery: Discovery,
    dry_run: bool,
    formatter: Formatter,
}

impl Orchestrator {
    /// Loads the config and resolves every path against `cwd`.
    pub fn new(args: &Args, cwd: &Utf8Path) -> Result<Self, OrchestratorError> {
        let absolute = |path: &Utf8Path| normalize_path(&cwd.join(path));

        let config = match &args.config {
            Some(path) => Config::load(&absolute(path))?,
            None => match Config::find(cwd) {
                Some(path) => Config::load(&path)?,
                None => {
                    tracing::debug!(dir = %cwd, "no config file found, using defaults");
                    Config::default()
                }
            },
        };

        let output_dir = match &args.output_dir {
            Some(dir) => absolute(dir),
            None => config
                .output_dir
                .clone()
                .ok_or(ConfigError::MissingOutputPath)?,
        };

        let mut ignore = config.ignore.clone();
        ignore.extend(args.ignore.iter().cloned());
        let discovery = Discovery::new(&ignore, &config.style_suffix)
            .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;

        let paths = if args.paths.is_empty() {
            vec![cwd.to_owned()]
        } else {
            args.paths.iter().map(|p| absolute(p)).collect()
        };

        tracing::debug!(
            config = ?config.source,
            output_dir = %output_dir,
            paths = paths.len(),
            "resolved run settings"
        );
        Ok(Self {
            config,
            output_dir,
            paths,
            discovery,
            dry_run: args.dry_run,
            formatter: Formatter::new(args.output),
        })
    }

    /// Discovers, converts and writes every component.
    pub fn run_once(&self) -> (Vec<FileReport>, RunSummary) {
        let files = self.discovery.discover(&self.paths);

        let mut reports: Vec<FileReport> = files.par_iter().map(|file| self.convert(file)).collect();
        flag_duplicate_outputs(&mut reports);

        if !self.dry_run {
            for report in &mut reports {
                self.write(report);
            }
        }

        let summary = RunSummary::from_reports(&reports);
        tracing::info!(
            converted = summary.converted,
            failed = summary.failed,
            skipped = summary.skipped,
            "run finished"
        );
        (reports, summary)
    }

    fn convert(&self, file: &SourceFile) -> FileReport {
        let source = match fs::read_to_string(&file.path) {
            Ok(source) => source,
            Err(e) => {
                return FileReport::without_output(
                    file.path.clone(),
                    FileStatus::Failed,
                    Some(format!("failed to read file: {e}")),
                )
            }
        };

        let options = self.config.transform_options(&file.path, &self.output_dir);
        match transform(&source, &options) {
            Ok(result) => FileReport {
                source: file.path.clone(),
                status: FileStatus::Converted,
                component: Some(result.component_name),
                output: Some(result.output_path),
                diagnostics: result.diagnostics,
                error: None,
                code: Some(result.code),
            },
            Err(TransformError::NoComponent { .. }) if !file.explicit => {
                tracing::debug!(file = %file.path, "no component, skipping");
                FileReport::without_output(file.path.clone(), FileStatus::Skipped, None)
            }
            Err(e) => {
                tracing::warn!(file = %file.path, error = %e, "conversion failed");
                FileReport::without_output(file.path.clone(), FileStatus::Failed, Some(error_chain(&e)))
            }
        }
    }

    /// Writes a converted component. Write failures fail only that file.
    fn write(&self, report: &mut FileReport) {
        let (Some(path), Some(code)) = (&report.output, &report.code) else {
            return;
        };
        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(path, code));

        match written {
            Ok(()) => {
                tracing::debug!(output = %path, "wrote component");
                report.status = FileStatus::Written;
                report.code = None;
            }
            Err(e) => {
                report.error = Some(format!("failed to write {path}: {e}"));
                report.status = FileStatus::Failed;
                report.code = None;
            }
        }
    }

    /// Converts on every change under the watched paths.
    fn watch(&self) -> Result<RunSummary, OrchestratorError> {
        use notify::{Config as WatchConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc;

        println!("Starting watch mode...\n");
        let (reports, summary) = self.run_once();
        print!("{}", self.formatter.format(&reports, &summary));

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            WatchConfig::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| OrchestratorError::WatchFailed(e.to_string()))?;

        for path in &self.paths {
            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher
                .watch(path.as_std_path(), mode)
                .map_err(|e| OrchestratorError::WatchFailed(e.to_string()))?;
        }

        println!("Watching for changes... (Ctrl+C to stop)\n");

        while let Ok(event) = rx.recv() {
            let relevant = !matches!(event.kind, EventKind::Access(_))
                && event.paths.iter().any(|p| {
                    p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| COMPONENT_EXTENSIONS.contains(&ext))
                });
            if !relevant {
                continue;
            }

            while rx.recv_timeout(WATCH_DEBOUNCE).is_ok() {}

            println!("File changed, re-converting...\n");
            let (reports, summary) = self.run_once();
            print!("{}", self.formatter.format(&reports, &summary));
        }

        Err(OrchestratorError::WatchFailed(
            "watch channel closed unexpectedly".to_string(),
        ))
    }
}

/// Warns on components that write the same output file. The later file in
/// path order wins.
fn flag_duplicate_outputs(reports: &mut [FileReport]) {
    let mut seen: HashMap<Utf8PathBuf, Utf8PathBuf> = HashMap::new();
    for report in reports.iter_mut() {
        let Some(output) = &report.output else {
            continue;
        };
        if let Some(first) = seen.insert(output.clone(), report.source.clone()) {
            report.diagnostics.push(Diagnostic::new(
                DiagnosticCode::DuplicateOutput,
                format!("{output} is also generated from {first} and will be overwritten"),
                1,
                1,
            ));
        }
    }
}

/// Joins an error with its sources.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
