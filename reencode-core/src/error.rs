// ============================================================================
// reencode-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the reencode-core library
//
// KEY COMPONENTS:
// - CoreError: errors that abort a pipeline stage or the whole run
// - ProbeError: ffprobe could not read a candidate file
// - EncodeError: one job failed; collected per job, never fatal to the batch
//
// PROPAGATION POLICY:
// - Probe failures during discovery are fatal (CoreError::Discovery)
// - Deletion failures during filtering are logged and swallowed
// - Encode failures are isolated per job in the BatchReport

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors returned by pipeline stages of the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Discovery failed while probing {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: ProbeError,
    },

    #[error("Failed to delete {}: {source}", .path.display())]
    Deletion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Failure to read container metadata from a media file.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to start ffprobe: {0}")]
    Spawn(#[source] io::Error),

    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("could not parse ffprobe output: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single encode job.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("pass {pass} failed (exit status {}): {diagnostics}", format_status(.status))]
    PassFailed {
        pass: u8,
        status: Option<i32>,
        diagnostics: String,
    },

    #[error("encoder reported an error: {diagnostics}")]
    Engine { diagnostics: String },

    #[error("failed to prepare job: {0}")]
    Setup(#[source] io::Error),

    #[error("output {} is already produced by {claimed_by}", .output.display())]
    OutputConflict { output: PathBuf, claimed_by: String },
}

fn format_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "none".to_string(), |code| code.to_string())
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a `CoreError::CommandStart` for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds an `EncodeError::Spawn` for an encoder process that could not be spawned.
pub fn spawn_error(program: impl Into<String>, source: io::Error) -> EncodeError {
    EncodeError::Spawn {
        program: program.into(),
        source,
    }
}
