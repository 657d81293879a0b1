//! Classify command implementation.

use std::fs;

use crate::cli::args::{ClassifyArgs, OutputFormat};
use crate::core::classify::classify_project_files;
use crate::core::client::LlmClient;
use crate::core::models::ProjectMap;
use crate::error::Result;
use crate::render::{self, human, robot::ClassifyPayload, robot::QueryCostPayload};
use crate::storage::config::ResolvedConfig;

/// Execute the classify command.
///
/// # Errors
///
/// Returns an error if the map cannot be read or parsed, or if the query or
/// its validation fails.
pub async fn execute(
    args: &ClassifyArgs,
    config: &ResolvedConfig,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    let content = fs::read_to_string(&args.map)?;
    let map = ProjectMap::parse(&content)?;
    tracing::debug!(map = %args.map.display(), files = map.len(), "Loaded project map");

    let client = LlmClient::from_config(config)?;
    let payload = classify(&client, &map).await?;

    let output = render::render("classify", payload, format, pretty, human::render_classification)?;
    print!("{output}");
    Ok(())
}

/// Classify `map` and shape the result for output.
///
/// # Errors
///
/// Propagates query and validation errors.
pub async fn classify(client: &LlmClient, map: &ProjectMap) -> Result<ClassifyPayload> {
    let outcome = classify_project_files(client, map).await?;
    Ok(ClassifyPayload {
        files: outcome.classification.files,
        cost: outcome
            .record
            .as_ref()
            .map(|record| QueryCostPayload::new(record, outcome.total_cost_usd)),
    })
}
