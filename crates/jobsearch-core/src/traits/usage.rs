use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One billable call to an upstream model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    /// e.g. "embedding", "intent_parsing".
    pub purpose: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

impl UsageEvent {
    pub fn new(
        model: impl Into<String>,
        purpose: impl Into<String>,
        input_tokens: u64,
        output_tokens: u64,
        cost_usd: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            model: model.into(),
            purpose: purpose.into(),
            input_tokens,
            output_tokens,
            cost_usd,
        }
    }
}

/// Sink for usage events. Ranking never sees this.
pub trait IUsageReporter: Send + Sync {
    fn record(&self, event: UsageEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUsageReporter;

impl IUsageReporter for NoopUsageReporter {
    fn record(&self, _event: UsageEvent) {}
}

/// Per-purpose aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurposeTotals {
    pub count: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub by_purpose: BTreeMap<String, PurposeTotals>,
    pub total_calls: u64,
    pub total_cost_usd: f64,
}

/// Keeps events in memory for reporting within one process.
#[derive(Debug, Default)]
pub struct InMemoryUsageReporter {
    events: Mutex<Vec<UsageEvent>>,
}

impl InMemoryUsageReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UsageEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn summary(&self) -> UsageSummary {
        let events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut summary = UsageSummary::default();
        for e in events.iter() {
            let totals = summary.by_purpose.entry(e.purpose.clone()).or_default();
            totals.count += 1;
            totals.input_tokens += e.input_tokens;
            totals.output_tokens += e.output_tokens;
            totals.cost_usd += e.cost_usd;
            summary.total_calls += 1;
            summary.total_cost_usd += e.cost_usd;
        }
        summary
    }

    pub fn reset(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl IUsageReporter for InMemoryUsageReporter {
    fn record(&self, event: UsageEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
