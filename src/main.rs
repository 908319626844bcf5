use clap::Parser;
use files2folders::cli::{Cli, run_cli};
use files2folders::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Invalid arguments exit with clap's usage error code before any file is touched.
    let cli = Cli::parse();

    match run_cli(&cli) {
        Ok(report) if report.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
