//! Typed errors for the scoring, merge and storage layers.
//!
//! Everything here is scoped to a single ticker: callers log it, count it and
//! move on to the next symbol in the batch.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("ticker has no contributors")]
    EmptyContributorSet,

    #[error("contributor `{contributor}` has unsupported tier {tier}")]
    InvalidTier { contributor: String, tier: u8 },

    #[error("score {score} outside category scale 0..={max}")]
    ScoreOutOfRange { score: f64, max: f64 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("discovery window `{name}` = {hours}h outside 1..={max}h")]
    Window {
        name: &'static str,
        hours: i64,
        max: i64,
    },

    #[error("window of {hours}h before {now} is not representable")]
    Cutoff { now: DateTime<Utc>, hours: i64 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("scoring failed for {symbol}: {source}")]
    Score {
        symbol: String,
        #[source]
        source: ScoreError,
    },

    #[error("malformed mention state for {symbol}: {source}")]
    MalformedMentions {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode mention state for {symbol}: {source}")]
    EncodeMentions {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl MergeError {
    pub(crate) fn score(symbol: &str, source: ScoreError) -> Self {
        Self::Score {
            symbol: symbol.to_string(),
            source,
        }
    }
}
