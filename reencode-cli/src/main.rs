// reencode-cli/src/main.rs
//
// Entry point for the reencode binary. Parses arguments, dispatches the
// subcommand and maps the result to the process exit code:
// 0 all jobs succeeded, 1 fatal error, 2 some jobs failed.

use reencode::{Commands, EXIT_FATAL, parse_cli, run_command};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();

    let result = match cli.command {
        Commands::Run(args) => run_command(args, cli.verbose),
    };

    match result {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
