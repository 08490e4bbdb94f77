//! Rarity index over rhyme-tail classes.
//!
//! Converts a tail class's normalized frequency into a rarity score
//! `KR = 1 − freq_norm`, with additive smoothing for classes the
//! provider has never seen. Stateless given the table: callers pick a
//! general-English or genre-specific provider at construction.

use std::collections::HashMap;

use crate::types::TailClass;

/// Additive smoothing mass granted to unseen tail classes.
const SMOOTHING: f64 = 0.01;
/// Upper bound of the Zipf frequency scale.
const ZIPF_MAX: f64 = 7.0;

/// External frequency source for normalized tail-class frequencies.
///
/// Implementations return a value in [0, 1] (higher = more common), or
/// `None` for classes absent from their table.
pub trait FrequencyProvider: Send + Sync {
    fn frequency(&self, class: &TailClass) -> Option<f64>;
}

/// Rarity scoring over a pluggable frequency provider.
pub struct RarityIndex {
    provider: Box<dyn FrequencyProvider>,
    smoothing: f64,
}

impl RarityIndex {
    pub fn new(provider: Box<dyn FrequencyProvider>) -> Self {
        RarityIndex { provider, smoothing: SMOOTHING }
    }

    /// Rarity of a tail class, always in [0, 1]. Unseen classes get the
    /// smoothed near-maximal rarity rather than exactly 1.0.
    pub fn kr(&self, class: &TailClass) -> f64 {
        let freq = match self.provider.frequency(class) {
            Some(f) => f.clamp(0.0, 1.0),
            None => self.smoothing / (1.0 + self.smoothing),
        };
        (1.0 - freq).clamp(0.0, 1.0)
    }
}

impl Default for RarityIndex {
    /// An index with an empty table: every class is maximally rare
    /// (modulo smoothing). Useful when no corpus statistics exist.
    fn default() -> Self {
        RarityIndex::new(Box::new(TableFrequencyProvider::default()))
    }
}

/// In-memory frequency table, the common provider implementation.
#[derive(Debug, Default)]
pub struct TableFrequencyProvider {
    table: HashMap<TailClass, f64>,
}

impl TableFrequencyProvider {
    /// Build from raw occurrence counts, normalizing by the largest.
    pub fn from_counts(counts: impl IntoIterator<Item = (TailClass, u64)>) -> Self {
        let counts: Vec<(TailClass, u64)> = counts.into_iter().collect();
        let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;
        let table = counts
            .into_iter()
            .map(|(k, c)| (k, if max > 0.0 { c as f64 / max } else { 0.0 }))
            .collect();
        TableFrequencyProvider { table }
    }

    /// Build from Zipf frequencies on the usual 0..=7 scale.
    pub fn from_zipf(entries: impl IntoIterator<Item = (TailClass, f64)>) -> Self {
        let table = entries
            .into_iter()
            .map(|(k, z)| (k, (z / ZIPF_MAX).clamp(0.0, 1.0)))
            .collect();
        TableFrequencyProvider { table }
    }
}

impl FrequencyProvider for TableFrequencyProvider {
    fn frequency(&self, class: &TailClass) -> Option<f64> {
        self.table.get(class).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(nucleus: &str, coda: &[&str]) -> TailClass {
        TailClass {
            nucleus: nucleus.into(),
            coda: coda.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_common_class_is_not_rare() {
        let provider = TableFrequencyProvider::from_counts([
            (class("EY", &["SH", "AH", "N"]), 1000),
            (class("OY", &["Z"]), 10),
        ]);
        let idx = RarityIndex::new(Box::new(provider));
        assert!(idx.kr(&class("EY", &["SH", "AH", "N"])) < 0.05);
        assert!(idx.kr(&class("OY", &["Z"])) > 0.9);
    }

    #[test]
    fn test_unseen_class_smoothed() {
        let idx = RarityIndex::default();
        let kr = idx.kr(&class("AW", &["T"]));
        assert!(kr > 0.9 && kr < 1.0);
    }

    #[test]
    fn test_kr_bounds() {
        let provider = TableFrequencyProvider::from_zipf([
            (class("AH", &["N"]), 9.5), // over-scale zipf clamps
            (class("IY", &[]), 0.0),
        ]);
        let idx = RarityIndex::new(Box::new(provider));
        for c in [class("AH", &["N"]), class("IY", &[]), class("OY", &["L", "Z"])] {
            let kr = idx.kr(&c);
            assert!((0.0..=1.0).contains(&kr), "kr out of range: {}", kr);
        }
    }

    #[test]
    fn test_zipf_normalization() {
        let provider = TableFrequencyProvider::from_zipf([(class("AW", &["T"]), 3.5)]);
        let idx = RarityIndex::new(Box::new(provider));
        assert!((idx.kr(&class("AW", &["T"])) - 0.5).abs() < 1e-9);
    }
}
