// src/config/mod.rs
pub mod settings;
pub mod tiers;

pub use settings::{
    AppConfig, CategoryScale, DiscoveryConfig, ScoringConfig, TierPopulation, ValidatorConfig,
};
pub use tiers::{TierEntry, TierTable, UNTIERED};
