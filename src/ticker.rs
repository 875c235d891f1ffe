//! Core data model: messages in, ticker aggregates out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MergeError;
use crate::extract::TICKER_SIGIL;

/// One inbound message from a collector. Consumed entirely into mentions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub link: Option<String>,
}

/// One contributor's mention of one ticker. Last write wins per contributor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MentionRecord {
    /// Tier at the time of the mention; 0 = untiered.
    pub tier: u8,
    #[serde(default)]
    pub source_link: Option<String>,
    pub content: String,
}

/// contributor → record
pub type MentionMap = BTreeMap<String, MentionRecord>;

/// The aggregate tracked per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    pub category: String,
    pub score: f64,
    pub first_mentioned_at: DateTime<Utc>,
    pub last_mentioned_at: DateTime<Utc>,
    pub mentions: MentionMap,
}

/// Persisted row shape; `mention_details` is stored as opaque JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerRecord {
    pub ticker_symbol: String,
    pub category: String,
    pub mindshare_score: f64,
    pub last_mentioned_at: DateTime<Utc>,
    pub first_mentioned_at: DateTime<Utc>,
    pub mention_details: serde_json::Value,
}

impl Ticker {
    pub fn contributor_count(&self) -> usize {
        self.mentions.len()
    }

    /// Encode into the persisted row shape.
    pub fn to_record(&self) -> Result<TickerRecord, MergeError> {
        let mention_details = serde_json::to_value(&self.mentions).map_err(|source| {
            MergeError::EncodeMentions {
                symbol: self.symbol.clone(),
                source,
            }
        })?;
        Ok(TickerRecord {
            ticker_symbol: self.symbol.clone(),
            category: self.category.clone(),
            mindshare_score: self.score,
            last_mentioned_at: self.last_mentioned_at,
            first_mentioned_at: self.first_mentioned_at,
            mention_details,
        })
    }

    /// Decode a persisted row. Fails if `mention_details` is not a contributor map.
    pub fn from_record(rec: &TickerRecord) -> Result<Self, MergeError> {
        let mentions: MentionMap = serde_json::from_value(rec.mention_details.clone())
            .map_err(|source| MergeError::MalformedMentions {
                symbol: rec.ticker_symbol.clone(),
                source,
            })?;
        Ok(Self {
            symbol: rec.ticker_symbol.clone(),
            category: rec.category.clone(),
            score: rec.mindshare_score,
            first_mentioned_at: rec.first_mentioned_at,
            last_mentioned_at: rec.last_mentioned_at,
            mentions,
        })
    }
}

/// Canonical store key: uppercase, always carrying the `$` sigil.
///
/// `"$pepe"`, `"PEPE"` and `" $Pepe "` all map to `"$PEPE"`.
pub fn normalize_symbol(raw: &str) -> String {
    let t = raw.trim();
    let body = t.strip_prefix(TICKER_SIGIL).unwrap_or(t);
    let mut out = String::with_capacity(body.len() + 1);
    out.push(TICKER_SIGIL);
    out.push_str(&body.to_uppercase());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_symbol_variants() {
        assert_eq!(normalize_symbol("$pepe"), "$PEPE");
        assert_eq!(normalize_symbol("PEPE"), "$PEPE");
        assert_eq!(normalize_symbol("  $Pepe "), "$PEPE");
    }

    #[test]
    fn record_roundtrip_keeps_mentions() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let mut mentions = MentionMap::new();
        mentions.insert(
            "alice".into(),
            MentionRecord {
                tier: 1,
                source_link: Some("https://discord.com/channels/1/2/3".into()),
                content: "$WIF looks strong".into(),
            },
        );
        let t = Ticker {
            symbol: "$WIF".into(),
            category: "rising".into(),
            score: 120.5,
            first_mentioned_at: ts,
            last_mentioned_at: ts,
            mentions,
        };
        let rec = t.to_record().unwrap();
        assert_eq!(rec.mention_details["alice"]["tier"], 1);
        assert_eq!(Ticker::from_record(&rec).unwrap(), t);
    }

    #[test]
    fn malformed_mention_details_is_error() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let rec = TickerRecord {
            ticker_symbol: "$BAD".into(),
            category: "quiet".into(),
            mindshare_score: 0.0,
            last_mentioned_at: ts,
            first_mentioned_at: ts,
            mention_details: serde_json::json!(["not", "a", "map"]),
        };
        let err = Ticker::from_record(&rec).unwrap_err();
        assert!(
            matches!(err, MergeError::MalformedMentions { ref symbol, .. } if symbol == "$BAD")
        );
    }
}
