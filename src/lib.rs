// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod metrics;
pub mod scoring;
pub mod store;
pub mod ticker;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{merge_ticker, MentionAggregator, MergeReport, TickerMentions};
pub use crate::config::{AppConfig, TierTable};
pub use crate::discovery::{DiscoveryViews, Page, PageRequest, SortDirection, SortKey};
pub use crate::error::{MergeError, ScoreError, StoreError, ViewError};
pub use crate::extract::extract_tickers;
pub use crate::ingest::{IngestOutcome, IngestSession, SessionSummary};
pub use crate::scoring::{CategoryBands, Mindshare, MindshareScorer, MAX_SCORE};
pub use crate::store::{InMemoryTickerStore, TickerStore};
pub use crate::ticker::{Message, MentionMap, MentionRecord, Ticker, TickerRecord};
pub use crate::validate::{clean_author, MessageValidator};

use std::sync::Arc;

/// Scorer built from the loaded config, warning when the band scale cannot hold
/// the scorer's 0..=1000 output.
pub fn scorer_from_config(cfg: &AppConfig) -> MindshareScorer {
    let bands = CategoryBands::for_scale(cfg.scoring.category_scale);
    if bands.max() < MAX_SCORE {
        tracing::warn!(
            target: "config",
            band_max = bands.max(),
            score_max = MAX_SCORE,
            "category bands narrower than score range; high scores will fail categorization"
        );
    }
    MindshareScorer::new(cfg.scoring.total_tier_counts, bands)
}

/// Wire config, tier table and store into an aggregator.
pub fn build_aggregator<S: TickerStore>(
    cfg: &AppConfig,
    tiers: TierTable,
    store: Arc<S>,
) -> MentionAggregator<S> {
    MentionAggregator::new(store, Arc::new(tiers), Arc::new(scorer_from_config(cfg)))
}
