//! dir-diary CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use dir_diary::cli::Cli;
use dir_diary::core::logging::{self, LogSettings};
use dir_diary::render::error::render_error;
use dir_diary::render::human::set_color_enabled;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&LogSettings::resolve(
        cli.log_level.as_deref(),
        cli.json_output,
        cli.verbose,
    ));

    let format = cli.effective_format();
    if cli.no_color {
        set_color_enabled(false);
    }

    match dir_diary::cli::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, code = e.error_code(), "Command failed");
            eprintln!("{}", render_error(&e, format, cli.pretty));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
