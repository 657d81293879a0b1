//! The query function: one completion request with long-context fallback and
//! cost accounting.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::backend::{ChatBackend, ChatRequest, ChatResponse, FunctionSchema};
use super::cost::{CostTracker, QueryRecord};
use super::openai::OpenAiBackend;
use super::pricing::PricingTable;
use crate::error::{DiaryError, Result};
use crate::storage::config::ResolvedConfig;

/// Result of one successful query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Raw provider response.
    pub response: ChatResponse,
    /// Cost accounting for this query.
    pub record: QueryRecord,
    /// Cumulative cost of the tracker after this query.
    pub total_cost_usd: f64,
}

/// Output token budget by model name.
///
/// 32k-context models get 16000, 16k models 8000, other GPT-4 models 4000,
/// and everything else 2000.
#[must_use]
pub fn max_tokens_for_model(model: &str) -> u64 {
    let model = model.to_lowercase();
    if model.contains("32k") {
        16_000
    } else if model.contains("16k") {
        8_000
    } else if model.contains("gpt-4") {
        4_000
    } else {
        2_000
    }
}

/// Completion client holding the model selection, price table, and cost tracker.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatBackend>,
    model: String,
    long_context_fallback: Option<String>,
    pricing: Arc<PricingTable>,
    costs: CostTracker,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model", &self.model)
            .field("long_context_fallback", &self.long_context_fallback)
            .field("total_cost_usd", &self.costs.total_usd())
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Create a client with the built-in price table and a fresh cost tracker.
    pub fn new(backend: impl ChatBackend + 'static, model: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(backend),
            model: model.into(),
            long_context_fallback: None,
            pricing: Arc::new(PricingTable::builtin()),
            costs: CostTracker::new(),
        }
    }

    /// Build an OpenAI-backed client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::AuthNotConfigured`] without an API key, or an
    /// error if the HTTP client or price file cannot be loaded.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or(DiaryError::AuthNotConfigured)?;
        let backend = OpenAiBackend::new(api_key, &config.api_base, config.timeout)?;
        let pricing = match &config.pricing_file {
            Some(path) => PricingTable::load_from(path)?,
            None => PricingTable::builtin(),
        };

        Ok(Self::new(backend, config.model.clone())
            .with_fallback(config.long_context_fallback.clone())
            .with_pricing(pricing))
    }

    /// Set the long-context fallback model.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Option<String>) -> Self {
        self.long_context_fallback = fallback;
        self
    }

    /// Replace the price table.
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = Arc::new(pricing);
        self
    }

    /// Use a shared cost tracker.
    #[must_use]
    pub fn with_cost_tracker(mut self, costs: CostTracker) -> Self {
        self.costs = costs;
        self
    }

    /// Primary model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Long-context fallback model identifier, if configured.
    #[must_use]
    pub fn long_context_fallback(&self) -> Option<&str> {
        self.long_context_fallback.as_deref()
    }

    /// The price table used for cost accounting.
    #[must_use]
    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// The shared cost tracker.
    #[must_use]
    pub const fn costs(&self) -> &CostTracker {
        &self.costs
    }

    /// Cumulative cost of every query made through this client's tracker.
    #[must_use]
    pub fn total_cost_usd(&self) -> f64 {
        self.costs.total_usd()
    }

    /// Output token budget for the primary model, or for the fallback when
    /// `long` is set and a fallback exists.
    #[must_use]
    pub fn max_tokens(&self, long: bool) -> u64 {
        let model = match (&self.long_context_fallback, long) {
            (Some(fallback), true) => fallback,
            _ => &self.model,
        };
        max_tokens_for_model(model)
    }

    /// Send `prompt` as a single user message, optionally forcing a call to
    /// `function`, and account for its cost.
    ///
    /// On a context-length error the identical request is retried once
    /// against the fallback model, if one is configured; otherwise the error
    /// propagates unchanged.
    ///
    /// # Errors
    ///
    /// Returns the backend error for any unrecovered failure,
    /// [`DiaryError::ParseResponse`] if the response has no usage block, and
    /// [`DiaryError::UnknownModel`] before any request if the model about to
    /// be used is not priced.
    pub async fn query(
        &self,
        prompt: &str,
        function: Option<&FunctionSchema>,
    ) -> Result<QueryOutcome> {
        // Fail before spending money on a model that cannot be priced.
        self.pricing.lookup(&self.model)?;
        let request = ChatRequest::single_prompt(&self.model, prompt, function)
            .with_max_tokens(self.max_tokens(false));

        let (response, model_used, used_fallback) = match self.backend.complete(&request).await {
            Ok(response) => (response, self.model.as_str(), false),
            Err(err) if err.is_context_length_exceeded() => {
                let Some(fallback) = self.long_context_fallback.as_deref() else {
                    return Err(err);
                };
                warn!(
                    model = %self.model,
                    fallback = %fallback,
                    error = %err,
                    "Context length exceeded, retrying with long-context fallback"
                );
                self.pricing.lookup(fallback)?;
                let retry = request
                    .with_model(fallback)
                    .with_max_tokens(self.max_tokens(true));
                (self.backend.complete(&retry).await?, fallback, true)
            }
            Err(err) => return Err(err),
        };

        let usage = response.usage.ok_or_else(|| {
            DiaryError::ParseResponse("response has no usage block".to_string())
        })?;
        let cost_usd =
            self.pricing
                .calculate_cost(usage.prompt_tokens, usage.completion_tokens, model_used)?;

        let record = QueryRecord {
            model: model_used.to_string(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            cost_usd,
            used_fallback,
            completed_at: Utc::now(),
        };
        let total_cost_usd = self.costs.record(record.clone());

        info!(
            model = %record.model,
            prompt_tokens = record.prompt_tokens,
            completion_tokens = record.completion_tokens,
            cost_usd = record.cost_usd,
            total_cost_usd,
            "Query completed"
        );
        debug!(finish_reason = ?response.choices.first().and_then(|c| c.finish_reason.as_deref()));

        Ok(QueryOutcome {
            response,
            record,
            total_cost_usd,
        })
    }
}
