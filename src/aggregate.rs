//! # Mention Aggregator
//!
//! Folds per-contributor mention facts into the per-ticker aggregate and
//! rescores it.
//!
//! - New symbol: first = last = event time, score computed fresh.
//! - Known symbol: contributor records are replaced whole (last write wins),
//!   `first_mentioned_at` only moves earlier, `last_mentioned_at` only later.
//! - The full post-merge contributor set is rescored every time.
//!
//! Each symbol is merged inside its own store critical section. A failure for
//! one symbol is reported and skipped; it never touches the stored row or the
//! other symbols of the batch.

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::TierTable;
use crate::error::MergeError;
use crate::scoring::MindshareScorer;
use crate::store::TickerStore;
use crate::ticker::{normalize_symbol, MentionMap, MentionRecord, Ticker, TickerRecord};

/// symbol → contributor → record
pub type TickerMentions = BTreeMap<String, MentionMap>;

/// Pure merge step for one ticker.
pub fn merge_ticker(
    existing: Option<&Ticker>,
    symbol: &str,
    new_mentions: &MentionMap,
    event_ts: DateTime<Utc>,
    scorer: &MindshareScorer,
) -> Result<Ticker, MergeError> {
    let (mentions, first, last) = match existing {
        None => (new_mentions.clone(), event_ts, event_ts),
        Some(t) => {
            let mut m = t.mentions.clone();
            for (contributor, rec) in new_mentions {
                m.insert(contributor.clone(), rec.clone());
            }
            (
                m,
                t.first_mentioned_at.min(event_ts),
                t.last_mentioned_at.max(event_ts),
            )
        }
    };

    let ms = scorer
        .score(&mentions)
        .map_err(|e| MergeError::score(symbol, e))?;

    Ok(Ticker {
        symbol: symbol.to_string(),
        category: ms.category,
        score: ms.score,
        first_mentioned_at: first,
        last_mentioned_at: last,
        mentions,
    })
}

/// Outcome of a batch: rows written plus per-symbol failures.
#[derive(Debug, Default)]
pub struct MergeReport {
    pub updated: Vec<TickerRecord>,
    pub failed: Vec<(String, MergeError)>,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn updated_symbols(&self) -> Vec<&str> {
        self.updated
            .iter()
            .map(|r| r.ticker_symbol.as_str())
            .collect()
    }

    pub fn failed_symbols(&self) -> Vec<&str> {
        self.failed.iter().map(|(s, _)| s.as_str()).collect()
    }
}

/// Sole writer of the ticker store.
pub struct MentionAggregator<S: TickerStore> {
    store: Arc<S>,
    tiers: Arc<TierTable>,
    scorer: Arc<MindshareScorer>,
}

impl<S: TickerStore> Clone for MentionAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tiers: Arc::clone(&self.tiers),
            scorer: Arc::clone(&self.scorer),
        }
    }
}

impl<S: TickerStore> MentionAggregator<S> {
    pub fn new(store: Arc<S>, tiers: Arc<TierTable>, scorer: Arc<MindshareScorer>) -> Self {
        Self {
            store,
            tiers,
            scorer,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// One message → one record per extracted symbol, tier resolved now.
    ///
    /// Records are keyed by the contributor's canonical id, so case variants
    /// and aliases of one person share a single slot.
    pub fn mentions_for(
        &self,
        contributor: &str,
        content: &str,
        link: Option<&str>,
        symbols: &[String],
    ) -> TickerMentions {
        let record = MentionRecord {
            tier: self.tiers.tier_for(contributor),
            source_link: link.map(str::to_string),
            content: content.to_string(),
        };

        let id = self.tiers.canonical_id(contributor);
        let mut out = TickerMentions::new();
        for sym in symbols {
            out.entry(normalize_symbol(sym))
                .or_default()
                .insert(id.clone(), record.clone());
        }
        out
    }

    /// Merge mentions for a single symbol inside its critical section.
    pub fn merge_one(
        &self,
        symbol: &str,
        mentions: &MentionMap,
        event_ts: DateTime<Utc>,
    ) -> Result<TickerRecord, MergeError> {
        let key = normalize_symbol(symbol);
        let scorer = &self.scorer;
        self.store.update(&key, |current| {
            let existing = current.map(Ticker::from_record).transpose()?;
            let merged = merge_ticker(existing.as_ref(), &key, mentions, event_ts, scorer)?;
            merged.to_record()
        })
    }

    /// Merge every symbol of the batch independently.
    pub fn merge_batch(&self, batch: &TickerMentions, event_ts: DateTime<Utc>) -> MergeReport {
        let mut report = MergeReport::default();

        for (symbol, mentions) in batch {
            match self.merge_one(symbol, mentions, event_ts) {
                Ok(rec) => {
                    tracing::debug!(
                        target: "aggregate",
                        symbol = %rec.ticker_symbol,
                        score = rec.mindshare_score,
                        category = %rec.category,
                        "ticker merged"
                    );
                    counter!("merge_applied_total").increment(1);
                    report.updated.push(rec);
                }
                Err(e) => {
                    tracing::warn!(
                        target: "aggregate",
                        symbol = %symbol,
                        error = %e,
                        "merge aborted"
                    );
                    counter!("merge_failed_total").increment(1);
                    report.failed.push((symbol.clone(), e));
                }
            }
        }

        gauge!("tickers_tracked").set(self.store.len() as f64);
        report
    }
}
