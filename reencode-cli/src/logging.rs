// ============================================================================
// reencode-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern dispatch for console and file output
//
// Library code only uses the `log` macros. This module installs the backend:
// - Console chain on stderr: warnings and errors, or debug with --verbose
// - File chain: everything at debug level, one file per run
//
// Progress and results go through the reporter, not the console chain, so
// the two do not repeat each other.

use anyhow::Context;
use console::style;
use log::{Level, LevelFilter};
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the log file for a run started at `timestamp`.
pub fn log_file_path(log_dir: &Path, timestamp: &str) -> PathBuf {
    log_dir.join(format!("reencode_run_{}.log", timestamp))
}

fn styled_level(level: Level) -> String {
    let text = style(format!("{:<5}", level)).for_stderr();
    let text = match level {
        Level::Error => text.red().bold(),
        Level::Warn => text.yellow().bold(),
        Level::Info => text.green(),
        Level::Debug => text.cyan(),
        Level::Trace => text.dim(),
    };
    text.to_string()
}

/// Installs the global logger. Returns the log file path when one is written.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(|out, message, record| {
            out.finish(format_args!("{} {}", styled_level(record.level()), message))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    let mut log_path = None;
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = log_file_path(dir, &get_timestamp());
        let file = fern::log_file(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
        log_path = Some(path);
    }

    dispatch.apply().context("Failed to install logger")?;
    Ok(log_path)
}
