//! Models command implementation.

use crate::cli::args::OutputFormat;
use crate::cli::cost::load_pricing;
use crate::core::pricing::ModelPrice;
use crate::error::Result;
use crate::render::{self, human};
use crate::storage::config::ResolvedConfig;

/// Execute the models command.
///
/// # Errors
///
/// Returns an error if a configured price file cannot be loaded.
pub fn execute(config: &ResolvedConfig, format: OutputFormat, pretty: bool) -> Result<()> {
    let pricing = load_pricing(config)?;
    let prices: Vec<ModelPrice> = pricing.entries().into_iter().cloned().collect();

    let output = render::render("models", prices, format, pretty, |p| human::render_models(p))?;
    print!("{output}");
    Ok(())
}
