//! Model pricing data and per-query cost calculation.
//!
//! Prices are stored per token (USD), matching the record shape used by
//! external price files: `{name, prompt_cost_per_token, completion_cost_per_token}`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiaryError, Result};

/// Per-token pricing for a specific model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    /// Model identifier (e.g., "gpt-3.5-turbo").
    pub name: String,
    /// Cost per prompt token (USD).
    pub prompt_cost_per_token: f64,
    /// Cost per completion token (USD).
    pub completion_cost_per_token: f64,
}

impl ModelPrice {
    /// Create a new pricing entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        prompt_cost_per_token: f64,
        completion_cost_per_token: f64,
    ) -> Self {
        Self {
            name: name.into(),
            prompt_cost_per_token,
            completion_cost_per_token,
        }
    }

    /// Cost of a single request with the given token counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 * self.prompt_cost_per_token)
            + (completion_tokens as f64 * self.completion_cost_per_token)
    }
}

/// Collection of model prices keyed by normalized (lowercase) identifier.
#[derive(Debug, Clone)]
pub struct PricingTable {
    models: HashMap<String, ModelPrice>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PricingTable {
    /// Built-in OpenAI chat-completion prices.
    ///
    /// Pricing source: <https://openai.com/pricing>
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self {
            models: HashMap::new(),
        };

        // GPT-3.5 Turbo: $0.0015 / $0.002 per 1K
        table.add("gpt-3.5-turbo", 0.000_001_5, 0.000_002);
        table.add("gpt-3.5-turbo-0613", 0.000_001_5, 0.000_002);
        table.add("gpt-3.5-turbo-1106", 0.000_001, 0.000_002);
        table.add("gpt-3.5-turbo-0125", 0.000_000_5, 0.000_001_5);

        // GPT-3.5 Turbo 16K: $0.003 / $0.004 per 1K
        table.add("gpt-3.5-turbo-16k", 0.000_003, 0.000_004);
        table.add("gpt-3.5-turbo-16k-0613", 0.000_003, 0.000_004);

        // GPT-4: $0.03 / $0.06 per 1K
        table.add("gpt-4", 0.000_03, 0.000_06);
        table.add("gpt-4-0613", 0.000_03, 0.000_06);

        // GPT-4 32K: $0.06 / $0.12 per 1K
        table.add("gpt-4-32k", 0.000_06, 0.000_12);
        table.add("gpt-4-32k-0613", 0.000_06, 0.000_12);

        // GPT-4 Turbo: $0.01 / $0.03 per 1K
        table.add("gpt-4-turbo", 0.000_01, 0.000_03);
        table.add("gpt-4-1106-preview", 0.000_01, 0.000_03);
        table.add("gpt-4-0125-preview", 0.000_01, 0.000_03);

        // GPT-4o: $2.50 / $10 per million
        table.add("gpt-4o", 0.000_002_5, 0.000_01);
        // GPT-4o mini: $0.15 / $0.60 per million
        table.add("gpt-4o-mini", 0.000_000_15, 0.000_000_6);

        table
    }

    /// Build a table from explicit price records.
    ///
    /// Later records with the same (case-insensitive) name replace earlier ones.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ModelPrice>) -> Self {
        let models = records
            .into_iter()
            .map(|price| (price.name.to_lowercase(), price))
            .collect();
        Self { models }
    }

    /// Load a table from a JSON file holding an array of price records.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// carries a negative or non-finite rate.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!(?path, "Loading price table");
        let content = fs::read_to_string(path)?;
        let records: Vec<ModelPrice> =
            serde_json::from_str(&content).map_err(|e| DiaryError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if let Some(bad) = records.iter().find(|r| {
            !r.prompt_cost_per_token.is_finite()
                || !r.completion_cost_per_token.is_finite()
                || r.prompt_cost_per_token < 0.0
                || r.completion_cost_per_token < 0.0
        }) {
            return Err(DiaryError::ConfigParse {
                path: path.display().to_string(),
                message: format!("invalid rate for model '{}'", bad.name),
            });
        }

        Ok(Self::from_records(records))
    }

    fn add(&mut self, model: &str, prompt: f64, completion: f64) {
        self.models
            .insert(model.to_lowercase(), ModelPrice::new(model, prompt, completion));
    }

    /// Look up pricing for a model by name (case-insensitive).
    #[must_use]
    pub fn get(&self, model: &str) -> Option<&ModelPrice> {
        self.models.get(&model.to_lowercase())
    }

    /// Look up pricing for a model, failing on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::UnknownModel`] if the model is not in the table.
    pub fn lookup(&self, model: &str) -> Result<&ModelPrice> {
        self.get(model)
            .ok_or_else(|| DiaryError::UnknownModel(model.to_string()))
    }

    /// Cost of one request: `prompt_tokens * p + completion_tokens * c`.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::UnknownModel`] for a model absent from the table.
    /// An unknown model is never priced at zero.
    pub fn calculate_cost(
        &self,
        prompt_tokens: u64,
        completion_tokens: u64,
        model: &str,
    ) -> Result<f64> {
        Ok(self.lookup(model)?.cost(prompt_tokens, completion_tokens))
    }

    /// All price records, sorted by model name.
    #[must_use]
    pub fn entries(&self) -> Vec<&ModelPrice> {
        let mut entries: Vec<_> = self.models.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Number of models in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the table has no models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
