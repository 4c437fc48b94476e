// reencode-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use reencode_core::EncodeMode;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reencode: batch video transcoder",
    long_about = "Discovers videos in a folder, deletes the ones that are too short and \
                  re-encodes the rest to .mp4 with ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output on the console
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts every eligible video of the configured input folder
    Run(RunArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// JSON configuration file (inputFolder, outputFolder, targetBitrate, ...)
    #[arg(
        short,
        long,
        value_name = "CONFIG_FILE",
        default_value = "config.json",
        env = "REENCODE_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the encode mode from the config file (streaming, two-pass)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<EncodeMode>,

    /// Maximum number of files encoded at the same time
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Optional: Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long, default_value_t = false)]
    pub no_log: bool,

    /// Emit progress as newline-delimited JSON on stdout
    #[arg(long, default_value_t = false)]
    pub progress_json: bool,
}

/// Parses the process arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
