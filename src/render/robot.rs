//! Robot-mode (JSON) output.
//!
//! Every command prints one envelope with a stable `schema_version`, so
//! scripts can depend on the shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::cost::QueryRecord;
use crate::core::models::{FileClassification, SummaryKind};
use crate::core::pricing::ModelPrice;
use crate::error::Result;

/// Schema version stamped on every envelope.
pub const SCHEMA_VERSION: &str = "dir_diary.v1";

/// Envelope around command output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors: Vec::new(),
        }
    }
}

/// Cost of the query that produced a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryCostPayload {
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost_usd: f64,
    pub used_fallback: bool,
    /// Cumulative cost of the session.
    pub total_cost_usd: f64,
}

impl QueryCostPayload {
    #[must_use]
    pub fn new(record: &QueryRecord, total_cost_usd: f64) -> Self {
        Self {
            model: record.model.clone(),
            prompt_tokens: record.prompt_tokens,
            completion_tokens: record.completion_tokens,
            cost_usd: record.cost_usd,
            used_fallback: record.used_fallback,
            total_cost_usd,
        }
    }
}

/// `classify` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyPayload {
    pub files: Vec<FileClassification>,
    /// Absent when the map was empty and no request was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<QueryCostPayload>,
}

/// `summarize` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    pub file: String,
    pub kind: SummaryKind,
    pub summary: String,
    pub cost: QueryCostPayload,
}

/// `cost` result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimatePayload {
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub prompt_cost_per_token: f64,
    pub completion_cost_per_token: f64,
    pub cost_usd: f64,
}

impl CostEstimatePayload {
    #[must_use]
    pub fn new(price: &ModelPrice, prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            model: price.name.clone(),
            prompt_tokens,
            completion_tokens,
            prompt_cost_per_token: price.prompt_cost_per_token,
            completion_cost_per_token: price.completion_cost_per_token,
            cost_usd: price.cost(prompt_tokens, completion_tokens),
        }
    }
}

/// Serialize an envelope, optionally pretty-printed.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(output: &RobotOutput<T>, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::FileRole;
    use serde_json::Value;

    #[test]
    fn envelope_has_stable_fields() {
        let payload = ClassifyPayload {
            files: vec![FileClassification {
                path: "src/main.rs".to_string(),
                role: FileRole::Source,
            }],
            cost: None,
        };
        let json = render_json(&RobotOutput::new("classify", payload), false).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["command"], "classify");
        assert_eq!(value["data"]["files"][0]["role"], "source");
        assert!(value["data"].get("cost").is_none());
        assert!(value["errors"].as_array().unwrap().is_empty());
        assert!(!json.contains('\n'));
    }

    #[test]
    fn pretty_output_is_multiline() {
        let json = render_json(&RobotOutput::new("models", Vec::<ModelPrice>::new()), true).unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn cost_estimate_uses_price_rates() {
        let price = ModelPrice::new("gpt-4", 0.000_03, 0.000_06);
        let estimate = CostEstimatePayload::new(&price, 1_000, 500);
        assert_eq!(estimate.cost_usd, 1_000.0 * 0.000_03 + 500.0 * 0.000_06);
        assert_eq!(estimate.model, "gpt-4");
    }
}
