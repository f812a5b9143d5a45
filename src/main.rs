//! verstamp - stamp a date-based release version.
//!
//! This is the main entry point for the verstamp CLI tool.

use clap::Parser;
use std::process::ExitCode;
use verstamp::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {e:#}");
            ExitCode::FAILURE
        }
    }
}
