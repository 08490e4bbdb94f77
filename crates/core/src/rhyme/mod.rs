//! Rhyme predicates, classification, rarity, and score combination.

pub mod evaluate;
pub mod rarity;
pub mod scoring;

pub use rarity::{FrequencyProvider, RarityIndex, TableFrequencyProvider};
pub use scoring::ScoreWeights;
