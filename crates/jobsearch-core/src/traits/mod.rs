//! Seams to the collaborators that live outside this workspace.

mod collaborators;
mod usage;

pub use collaborators::{ExtractedIntent, IIntentExtractor, IQueryEmbedder};
pub use usage::{
    IUsageReporter, InMemoryUsageReporter, NoopUsageReporter, PurposeTotals, UsageEvent,
    UsageSummary,
};
