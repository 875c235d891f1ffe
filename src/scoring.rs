//! # Mindshare Scorer
//!
//! Turns a ticker's contributor set into a normalized score in `[0, 1000]` and
//! a category label.
//!
//! raw = Σ weight(tier)
//! raw *= 5.5 if any tier-1, *= 1.3 if more than one tier-1,
//!        *= 3.9 if any tier-2, *= 1.6 if more than one tier-2
//! ceiling = Σ ceil(0.25 · population[t]) · weight[t] · 1.2 · 1.3
//! score = min(raw / ceiling · 1000, 1000)
//!
//! The scorer never carries state between calls: every merge rescores the full
//! contributor set.

use crate::config::{CategoryScale, TierPopulation, UNTIERED};
use crate::error::ScoreError;
use crate::ticker::MentionMap;

pub const MAX_SCORE: f64 = 1000.0;

pub const TIER1_WEIGHT: f64 = 95.0;
pub const TIER2_WEIGHT: f64 = 55.0;
pub const TIER3_WEIGHT: f64 = 15.0;

const TIER1_PRESENCE_BONUS: f64 = 5.5;
const TIER1_MULTIPLE_BONUS: f64 = 1.3;
const TIER2_PRESENCE_BONUS: f64 = 3.9;
const TIER2_MULTIPLE_BONUS: f64 = 1.6;

/// Share of each tier's population assumed to pile onto a single ticker.
const THRESHOLD_SHARE: f64 = 0.25;
const CEILING_HEADROOM: f64 = 1.2 * 1.3;

/// Weight for a scoring tier; `None` for anything outside 1..=3.
pub fn tier_weight(tier: u8) -> Option<f64> {
    match tier {
        1 => Some(TIER1_WEIGHT),
        2 => Some(TIER2_WEIGHT),
        3 => Some(TIER3_WEIGHT),
        _ => None,
    }
}

/// Per-tier contributor counts for one ticker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub tier1: usize,
    pub tier2: usize,
    pub tier3: usize,
    pub untiered: usize,
}

/// Score plus its derived label. Always produced together.
#[derive(Debug, Clone, PartialEq)]
pub struct Mindshare {
    pub score: f64,
    pub category: String,
    pub counts: TierCounts,
}

/// Ordered score bands on an explicit scale.
///
/// Bands are `(lower_bound, label)` sorted by descending bound; the first band
/// whose bound is `<=` the score wins. Scores outside `0..=max` are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBands {
    max: f64,
    bands: Vec<(f64, String)>,
}

const BAND_LABELS: [(f64, &str); 5] = [
    (0.80, "viral"),
    (0.60, "hot"),
    (0.40, "rising"),
    (0.20, "emerging"),
    (0.0, "quiet"),
];

impl CategoryBands {
    /// Build from fractions of the scale maximum.
    fn scaled(max: f64) -> Self {
        Self {
            max,
            bands: BAND_LABELS
                .iter()
                .map(|(frac, label)| (frac * max, (*label).to_string()))
                .collect(),
        }
    }

    /// Bands over 0..=1000, matching `MAX_SCORE`.
    pub fn mindshare() -> Self {
        Self::scaled(MAX_SCORE)
    }

    /// Bands over 0..=100. Scores from the 0..=1000 scorer above 100 are
    /// rejected as out of range.
    pub fn percent() -> Self {
        Self::scaled(100.0)
    }

    pub fn for_scale(scale: CategoryScale) -> Self {
        match scale {
            CategoryScale::Mindshare => Self::mindshare(),
            CategoryScale::Percent => Self::percent(),
        }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn categorize(&self, score: f64) -> Result<&str, ScoreError> {
        if !score.is_finite() || score < 0.0 || score > self.max {
            return Err(ScoreError::ScoreOutOfRange {
                score,
                max: self.max,
            });
        }
        self.bands
            .iter()
            .find(|(bound, _)| score >= *bound)
            .map(|(_, label)| label.as_str())
            .ok_or(ScoreError::ScoreOutOfRange {
                score,
                max: self.max,
            })
    }
}

impl Default for CategoryBands {
    fn default() -> Self {
        Self::mindshare()
    }
}

/// Pure scorer parameterised by tier populations and band table.
#[derive(Debug, Clone)]
pub struct MindshareScorer {
    population: TierPopulation,
    bands: CategoryBands,
    theoretical_max: f64,
}

impl MindshareScorer {
    pub fn new(population: TierPopulation, bands: CategoryBands) -> Self {
        let theoretical_max = theoretical_max(&population);
        Self {
            population,
            bands,
            theoretical_max,
        }
    }

    pub fn population(&self) -> TierPopulation {
        self.population
    }

    pub fn bands(&self) -> &CategoryBands {
        &self.bands
    }

    pub fn theoretical_max(&self) -> f64 {
        self.theoretical_max
    }

    /// Count contributors per tier. Untiered (0) is tallied, anything else
    /// outside 1..=3 is an error naming the offending contributor.
    pub fn count_tiers(mentions: &MentionMap) -> Result<TierCounts, ScoreError> {
        let mut counts = TierCounts::default();
        for (contributor, rec) in mentions {
            match rec.tier {
                1 => counts.tier1 += 1,
                2 => counts.tier2 += 1,
                3 => counts.tier3 += 1,
                UNTIERED => counts.untiered += 1,
                tier => {
                    return Err(ScoreError::InvalidTier {
                        contributor: contributor.clone(),
                        tier,
                    })
                }
            }
        }
        Ok(counts)
    }

    /// Bonus-weighted raw score before normalization.
    pub fn raw_score(counts: &TierCounts) -> f64 {
        let mut raw = counts.tier1 as f64 * TIER1_WEIGHT
            + counts.tier2 as f64 * TIER2_WEIGHT
            + counts.tier3 as f64 * TIER3_WEIGHT;

        if counts.tier1 > 0 {
            raw *= TIER1_PRESENCE_BONUS;
        }
        if counts.tier1 > 1 {
            raw *= TIER1_MULTIPLE_BONUS;
        }
        if counts.tier2 > 0 {
            raw *= TIER2_PRESENCE_BONUS;
        }
        if counts.tier2 > 1 {
            raw *= TIER2_MULTIPLE_BONUS;
        }
        raw
    }

    /// Normalized score without the cap, for diagnostics.
    pub fn uncapped(&self, counts: &TierCounts) -> f64 {
        if self.theoretical_max <= 0.0 {
            return 0.0;
        }
        Self::raw_score(counts) / self.theoretical_max * MAX_SCORE
    }

    /// Score the full contributor set of one ticker.
    pub fn score(&self, mentions: &MentionMap) -> Result<Mindshare, ScoreError> {
        if mentions.is_empty() {
            return Err(ScoreError::EmptyContributorSet);
        }
        let counts = Self::count_tiers(mentions)?;
        let score = self.uncapped(&counts).min(MAX_SCORE);
        let category = self.bands.categorize(score)?.to_string();
        Ok(Mindshare {
            score,
            category,
            counts,
        })
    }
}

impl Default for MindshareScorer {
    fn default() -> Self {
        Self::new(TierPopulation::default(), CategoryBands::default())
    }
}

fn tier_threshold(population: u32, weight: f64) -> f64 {
    (THRESHOLD_SHARE * population as f64).ceil() * weight
}

fn theoretical_max(p: &TierPopulation) -> f64 {
    (tier_threshold(p.tier1, TIER1_WEIGHT)
        + tier_threshold(p.tier2, TIER2_WEIGHT)
        + tier_threshold(p.tier3, TIER3_WEIGHT))
        * CEILING_HEADROOM
}
