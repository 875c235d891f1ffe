//! # Contributor Tiers
//!
//! Configurable mapping from contributor identity (Discord/X handle) to an
//! influence tier, `1` being the most influential.
//!
//! - Loads from JSON (`contributors` + `aliases`).
//! - Case-insensitive lookup; leading `@` and extra whitespace are ignored.
//! - Aliases map alternate handles to a canonical contributor.
//! - Unknown contributors resolve to tier `0` ("untiered").
//!
//! Loaded once at startup and shared read-only (`Arc<TierTable>`).

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_TIERS_PATH: &str = "CONTRIBUTOR_TIERS_PATH";
pub const DEFAULT_TIERS_PATH: &str = "config/contributor_tiers.json";

/// Tier assigned to contributors missing from the table.
pub const UNTIERED: u8 = 0;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TierEntry {
    pub tier: u8,
    /// Free-form label (e.g. "alpha", "kol", "news").
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TierTable {
    #[serde(default)]
    contributors: HashMap<String, TierEntry>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

impl TierTable {
    /// Build from `(contributor, tier, category)` triples.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u8, Option<&'static str>)>,
        S: AsRef<str>,
    {
        let contributors = entries
            .into_iter()
            .map(|(name, tier, category)| {
                (
                    normalize(name.as_ref()),
                    TierEntry {
                        tier,
                        category: category.map(str::to_string),
                    },
                )
            })
            .collect();
        Self {
            contributors,
            aliases: HashMap::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases.insert(normalize(alias), normalize(canonical));
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: TierTable = serde_json::from_str(s).context("parsing contributor tiers JSON")?;
        Ok(raw.normalized())
    }

    /// Load from an explicit JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading contributor tiers from {}", path.display()))?;
        Self::from_json_str(&content)
    }

    /// Load using env var + fallback:
    /// 1) $CONTRIBUTOR_TIERS_PATH
    /// 2) config/contributor_tiers.json
    /// 3) empty table (everyone untiered)
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_TIERS_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_TIERS_PATH} points to non-existent path"));
        }
        let fallback = PathBuf::from(DEFAULT_TIERS_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        tracing::warn!(
            target: "config",
            path = DEFAULT_TIERS_PATH,
            "no contributor tier table found; all contributors untiered"
        );
        Ok(Self::default())
    }

    /// Resolve the entry for a contributor: alias → exact.
    pub fn entry_for(&self, contributor: &str) -> Option<&TierEntry> {
        let key = normalize(contributor);
        if let Some(canon) = self.aliases.get(&key) {
            if let Some(e) = self.contributors.get(canon) {
                return Some(e);
            }
        }
        self.contributors.get(&key)
    }

    /// Identity key for a contributor: the alias target when one exists,
    /// otherwise the normalized handle. `Ansem`, `@ansem` and an alias of
    /// `ansem` all map to `ansem`.
    pub fn canonical_id(&self, contributor: &str) -> String {
        let key = normalize(contributor);
        match self.aliases.get(&key) {
            Some(canon) => canon.clone(),
            None => key,
        }
    }

    pub fn tier_for(&self, contributor: &str) -> u8 {
        self.entry_for(contributor)
            .map(|e| e.tier)
            .unwrap_or(UNTIERED)
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    fn normalized(self) -> Self {
        Self {
            contributors: self
                .contributors
                .into_iter()
                .map(|(k, v)| (normalize(&k), v))
                .collect(),
            aliases: self
                .aliases
                .into_iter()
                .map(|(a, c)| (normalize(&a), normalize(&c)))
                .collect(),
        }
    }
}

/// Lowercase, drop a leading `@`, collapse whitespace.
fn normalize(s: &str) -> String {
    let t = s.trim();
    let t = t.strip_prefix('@').unwrap_or(t);
    t.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "contributors": {
            "Ansem": { "tier": 1, "category": "kol" },
            "  Murad  ": { "tier": 2 },
            "degen spartan": { "tier": 3, "category": "alpha" }
        },
        "aliases": { "@blknoiz06": "ansem" }
    }"#;

    #[test]
    fn case_insensitive_lookup() {
        let t = TierTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(t.tier_for("ANSEM"), 1);
        assert_eq!(t.tier_for("murad"), 2);
        assert_eq!(t.tier_for("@Murad"), 2);
        assert_eq!(t.tier_for("Degen   Spartan"), 3);
    }

    #[test]
    fn alias_resolves_to_canonical() {
        let t = TierTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(t.tier_for("blknoiz06"), 1);
        assert_eq!(
            t.entry_for("@BLKNOIZ06").and_then(|e| e.category.as_deref()),
            Some("kol")
        );
    }

    #[test]
    fn unknown_is_untiered() {
        let t = TierTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(t.tier_for("random_anon"), UNTIERED);
        assert!(t.entry_for("random_anon").is_none());
    }

    #[test]
    fn builder_helpers() {
        let t = TierTable::from_entries([("alice", 1, None), ("bob", 2, Some("news"))])
            .with_alias("al", "Alice");
        assert_eq!(t.len(), 2);
        assert_eq!(t.tier_for("AL"), 1);
        assert_eq!(t.tier_for("bob"), 2);
    }

    #[test]
    fn canonical_id_folds_case_and_aliases() {
        let t = TierTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(t.canonical_id("Ansem"), "ansem");
        assert_eq!(t.canonical_id("@ANSEM"), "ansem");
        assert_eq!(t.canonical_id("blknoiz06"), "ansem");
        assert_eq!(t.canonical_id("Degen   Spartan"), "degen spartan");
        assert_eq!(t.canonical_id("Random_Anon"), "random_anon");
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(TierTable::from_json_str("{ not json").is_err());
    }
}
