// reencode-cli/src/lib.rs
//
// Library portion of the Reencode CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, RunArgs, parse_cli};
pub use commands::run::{RunOutcome, load_config, run_command};
pub use error::{CliResult, EXIT_FATAL, EXIT_JOBS_FAILED, EXIT_SUCCESS};
