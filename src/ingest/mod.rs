// src/ingest/mod.rs
//! Ingestion session: message → validate → extract → resolve tiers → merge.
//!
//! One `IngestSession` per producer. Sessions share the aggregator (and with it
//! the store and tier table) but each keeps its own validator counters.

pub mod providers;
pub mod types;

use metrics::counter;
use serde::Serialize;

use crate::aggregate::{MentionAggregator, MergeReport};
use crate::config::ValidatorConfig;
use crate::extract::extract_tickers;
use crate::store::TickerStore;
use crate::ticker::Message;
use crate::validate::{clean_author, MessageValidator, ValidationStats};
use types::MessageSource;

/// What happened to one message.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Failed validation (noise, too short, repost-only).
    Rejected,
    /// Valid, but no ticker candidates.
    NoTickers,
    /// Merged into the store; some symbols may still have failed.
    Merged(MergeReport),
}

/// Totals for one session, suitable for a log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub validation: ValidationStats,
    pub mentions: u64,
    pub merged: u64,
    pub failed: u64,
}

impl SessionSummary {
    /// Sum two sessions (e.g. one per producer task).
    pub fn combine(self, other: &SessionSummary) -> Self {
        Self {
            validation: ValidationStats {
                valid: self.validation.valid + other.validation.valid,
                invalid: self.validation.invalid + other.validation.invalid,
            },
            mentions: self.mentions + other.mentions,
            merged: self.merged + other.merged,
            failed: self.failed + other.failed,
        }
    }
}

pub struct IngestSession<S: TickerStore> {
    validator: MessageValidator,
    aggregator: MentionAggregator<S>,
    mentions: u64,
    merged: u64,
    failed: u64,
}

impl<S: TickerStore> IngestSession<S> {
    pub fn new(cfg: &ValidatorConfig, aggregator: MentionAggregator<S>) -> Self {
        crate::metrics::ensure_described();
        Self {
            validator: MessageValidator::new(cfg),
            aggregator,
            mentions: 0,
            merged: 0,
            failed: 0,
        }
    }

    pub fn aggregator(&self) -> &MentionAggregator<S> {
        &self.aggregator
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            validation: self.validator.stats(),
            mentions: self.mentions,
            merged: self.merged,
            failed: self.failed,
        }
    }

    pub fn ingest(&mut self, msg: &Message) -> IngestOutcome {
        counter!("ingest_messages_total").increment(1);

        let checked = self.validator.validate(&msg.text);
        if !checked.is_valid {
            counter!("ingest_invalid_total").increment(1);
            return IngestOutcome::Rejected;
        }
        counter!("ingest_valid_total").increment(1);

        let symbols = extract_tickers(&checked.cleaned);
        if symbols.is_empty() {
            return IngestOutcome::NoTickers;
        }
        counter!("ingest_mentions_total").increment(symbols.len() as u64);
        self.mentions += symbols.len() as u64;

        let author = clean_author(&msg.author);
        let batch = self.aggregator.mentions_for(
            &author,
            &checked.cleaned,
            msg.link.as_deref(),
            &symbols,
        );
        let report = self.aggregator.merge_batch(&batch, msg.timestamp);
        self.merged += report.updated.len() as u64;
        self.failed += report.failed.len() as u64;

        IngestOutcome::Merged(report)
    }

    pub fn ingest_all<'m, I>(&mut self, msgs: I) -> Vec<IngestOutcome>
    where
        I: IntoIterator<Item = &'m Message>,
    {
        msgs.into_iter().map(|m| self.ingest(m)).collect()
    }
}

/// Pull one batch from every source and run it through the session.
/// A failing source is logged and skipped.
pub async fn run_once<S: TickerStore>(
    sources: &[Box<dyn MessageSource>],
    session: &mut IngestSession<S>,
) -> SessionSummary {
    for src in sources {
        match src.fetch_latest().await {
            Ok(msgs) => {
                session.ingest_all(msgs.iter());
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = src.name(), "source error");
                counter!("ingest_source_errors_total").increment(1);
            }
        }
    }

    let summary = session.summary();
    tracing::info!(
        target: "ingest",
        valid = summary.validation.valid,
        invalid = summary.validation.invalid,
        mentions = summary.mentions,
        merged = summary.merged,
        failed = summary.failed,
        "ingest run finished"
    );
    summary
}
