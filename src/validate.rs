//! # Message Validator
//!
//! Cleans raw message text and classifies it as signal or noise.
//!
//! Cleaning order:
//! 1) truncate at the first noise marker (repost/forward footer)
//! 2) drop `http://` / `https://` tokens
//! 3) re-join with single spaces, trim
//!
//! A message is valid when the cleaned text has at least `min_content_length`
//! characters. Each validator keeps its own valid/invalid tallies, so create
//! one per ingestion session.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::ValidatorConfig;

/// Result of validating one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub cleaned: String,
    pub is_valid: bool,
}

/// Running counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    pub valid: u64,
    pub invalid: u64,
}

impl ValidationStats {
    pub fn total(&self) -> u64 {
        self.valid + self.invalid
    }
}

#[derive(Debug, Clone)]
pub struct MessageValidator {
    min_content_length: usize,
    noise_markers: Vec<String>,
    stats: ValidationStats,
}

impl MessageValidator {
    pub fn new(cfg: &ValidatorConfig) -> Self {
        Self {
            min_content_length: cfg.min_content_length,
            noise_markers: cfg
                .noise_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
            stats: ValidationStats::default(),
        }
    }

    pub fn min_content_length(&self) -> usize {
        self.min_content_length
    }

    pub fn stats(&self) -> ValidationStats {
        self.stats
    }

    /// Clean the text without touching the session counters.
    pub fn clean(&self, text: &str) -> String {
        let cut = self
            .noise_markers
            .iter()
            .filter_map(|m| text.find(m.as_str()))
            .min()
            .unwrap_or(text.len());

        text[..cut]
            .split_whitespace()
            .filter(|tok| !is_url(tok))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean, classify and record the outcome in the session counters.
    pub fn validate(&mut self, text: &str) -> Validation {
        let cleaned = self.clean(text);
        let len = cleaned.chars().count();
        let is_valid = len > 0 && len >= self.min_content_length;

        if is_valid {
            self.stats.valid += 1;
        } else {
            self.stats.invalid += 1;
            // Never log raw text; hashed id only.
            tracing::debug!(
                target: "ingest",
                id = %anon_hash(text),
                len,
                min = self.min_content_length,
                "message rejected"
            );
        }

        Validation { cleaned, is_valid }
    }
}

fn is_url(tok: &str) -> bool {
    tok.starts_with("http://") || tok.starts_with("https://")
}

/// Reduce `"name • platform"` or `"name#1234"` to `name`; anything else is
/// returned unchanged.
pub fn clean_author(raw: &str) -> String {
    if let Some((name, _)) = raw.split_once('•') {
        return name.trim().to_string();
    }
    if let Some((name, _)) = raw.split_once('#') {
        return name.trim().to_string();
    }
    raw.to_string()
}

/// Short, stable, anonymised id for log lines.
pub(crate) fn anon_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
