//! CLI argument parsing and command dispatch.

pub mod args;
pub mod classify;
pub mod cost;
pub mod models;
pub mod summarize;

pub use args::{Cli, Commands, OutputFormat};

use crate::error::Result;
use crate::storage::config::ResolvedConfig;

/// Run the parsed command line.
///
/// # Errors
///
/// Returns the first error from configuration or the command itself.
pub async fn run(cli: &Cli) -> Result<()> {
    let format = cli.effective_format();
    let pretty = cli.pretty;
    let config = ResolvedConfig::resolve(cli)?;

    match &cli.command {
        Commands::Classify(args) => classify::execute(args, &config, format, pretty).await,
        Commands::Summarize(args) => summarize::execute(args, &config, format, pretty).await,
        Commands::Cost(args) => cost::execute(args, &config, format, pretty),
        Commands::Models => models::execute(&config, format, pretty),
    }
}
