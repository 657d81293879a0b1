//! Running cost accumulator shared across queries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cost accounting for one served query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Model that actually served the request.
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Cost of this query in USD.
    pub cost_usd: f64,
    /// Whether the long-context fallback model served it.
    pub used_fallback: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Ledger {
    total_usd: f64,
    records: Vec<QueryRecord>,
}

/// Thread-safe cumulative cost tracker.
///
/// Clones share the same ledger. The total only ever grows: it is the sum of
/// every recorded query's cost, in recording order.
#[derive(Debug, Clone, Default)]
pub struct CostTracker {
    inner: Arc<Mutex<Ledger>>,
}

impl CostTracker {
    /// A tracker starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // A poisoned ledger still holds consistent totals; each update is a
        // single push + add.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a query to the ledger and return the new cumulative total.
    pub fn record(&self, record: QueryRecord) -> f64 {
        let mut ledger = self.ledger();
        ledger.total_usd += record.cost_usd;
        ledger.records.push(record);
        ledger.total_usd
    }

    /// Cumulative cost in USD.
    #[must_use]
    pub fn total_usd(&self) -> f64 {
        self.ledger().total_usd
    }

    /// Number of recorded queries.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.ledger().records.len()
    }

    /// Copy of every recorded query, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<QueryRecord> {
        self.ledger().records.clone()
    }
}
