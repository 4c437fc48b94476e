// ============================================================================
// reencode-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and process exit codes
//
// Core errors are typed (reencode_core::CoreError). The CLI only adds context
// and turns the final result into an exit code, so anyhow is enough here.

/// Result type for CLI operations.
pub type CliResult<T> = anyhow::Result<T>;

/// Every job of the batch succeeded (or there was nothing to do).
pub const EXIT_SUCCESS: u8 = 0;

/// The run stopped early: bad configuration, missing tool, discovery failure.
pub const EXIT_FATAL: u8 = 1;

/// The batch ran to completion but at least one job failed.
pub const EXIT_JOBS_FAILED: u8 = 2;
