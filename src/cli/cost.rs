//! Cost command implementation.
//!
//! Offline: prices a hypothetical query without contacting the provider.

use crate::cli::args::{CostArgs, OutputFormat};
use crate::core::pricing::PricingTable;
use crate::error::Result;
use crate::render::{self, human, robot::CostEstimatePayload};
use crate::storage::config::ResolvedConfig;

/// Load the price table selected by configuration.
///
/// # Errors
///
/// Returns an error if a configured price file cannot be loaded.
pub fn load_pricing(config: &ResolvedConfig) -> Result<PricingTable> {
    config
        .pricing_file
        .as_deref()
        .map_or_else(|| Ok(PricingTable::builtin()), PricingTable::load_from)
}

/// Execute the cost command.
///
/// # Errors
///
/// Returns [`crate::error::DiaryError::UnknownModel`] if the model is not priced.
pub fn execute(
    args: &CostArgs,
    config: &ResolvedConfig,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    let pricing = load_pricing(config)?;
    let price = pricing.lookup(&config.model)?;
    let payload = CostEstimatePayload::new(price, args.prompt_tokens, args.completion_tokens);

    tracing::debug!(model = %payload.model, cost_usd = payload.cost_usd, "Computed cost estimate");

    let output = render::render("cost", payload, format, pretty, human::render_cost_estimate)?;
    print!("{output}");
    Ok(())
}
