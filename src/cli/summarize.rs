//! Summarize command implementation.

use std::fs;

use crate::cli::args::{OutputFormat, SummarizeArgs};
use crate::core::client::LlmClient;
use crate::core::summarize::summarize_code;
use crate::error::{DiaryError, Result};
use crate::render::{self, human, robot::QueryCostPayload, robot::SummaryPayload};
use crate::storage::config::ResolvedConfig;

/// Execute the summarize command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is empty, or the query fails.
pub async fn execute(
    args: &SummarizeArgs,
    config: &ResolvedConfig,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    let code = fs::read_to_string(&args.file)?;
    if code.trim().is_empty() {
        return Err(DiaryError::Config(format!(
            "{} is empty, nothing to summarize",
            args.file.display()
        )));
    }

    let client = LlmClient::from_config(config)?;
    let outcome = summarize_code(&client, &code, args.kind).await?;

    let payload = SummaryPayload {
        file: args.file.display().to_string(),
        kind: outcome.kind,
        summary: outcome.text,
        cost: QueryCostPayload::new(&outcome.record, outcome.total_cost_usd),
    };

    let output = render::render("summarize", payload, format, pretty, human::render_summary)?;
    print!("{output}");
    Ok(())
}
