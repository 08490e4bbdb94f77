//! Weighted rhyme score combination.
//!
//! Folds the predicate record and the rarity index into a single score
//! in [0, 1], then applies the override and confidence rules.

use serde::{Deserialize, Serialize};

use crate::types::{MatchResult, RhymeClass};

/// Upweight when two or more independent predicate families agree.
const AGREEMENT_BONUS: f64 = 0.03;
/// Downweight when pronunciation variants disagree on classification.
const AMBIGUITY_PENALTY: f64 = 0.05;
/// Floor enforced for strict-perfect and homophone pairs.
const PERFECT_FLOOR: f64 = 0.95;

/// Weights of the score combination. Defaults are the tuned values;
/// callers may rebalance for genre-specific scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub k3: f64,
    pub k2: f64,
    pub k2_5: f64,
    pub k1: f64,
    pub kc: f64,
    pub kf: f64,
    pub kp: f64,
    pub km: f64,
    pub kr: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            k3: 1.00,
            k2: 0.85,
            k2_5: 0.60,
            k1: 0.35,
            kc: 0.20,
            kf: 0.15,
            kp: 0.15,
            km: 0.10,
            kr: 0.20,
        }
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Re-apply the hard overrides after any adjustment.
fn apply_overrides(wrs: f64, m: &MatchResult) -> f64 {
    if m.class == RhymeClass::EyeRhymeExcluded {
        return 0.0;
    }
    let wrs = clamp01(wrs);
    if m.k3 || m.class == RhymeClass::Homophone {
        wrs.max(PERFECT_FLOOR)
    } else {
        wrs
    }
}

/// Number of independent predicate families with a firing member.
/// Families: exactness {K3, K2, K2.5}, vowel {K1, K0}, consonant
/// {KC, KF, KP}, continuity {KM}.
fn family_agreement(m: &MatchResult) -> usize {
    let exact = m.k3 || m.k2 || m.k2_5;
    let vowel = m.k1 > 0.0 || m.k0 > 0.0;
    let consonant = m.kc > 0.0 || m.kf > 0.0 || m.kp > 0.0;
    let continuity = m.km > 0.0;
    [exact, vowel, consonant, continuity]
        .iter()
        .filter(|&&f| f)
        .count()
}

/// Weighted Rhyme Score for one predicate record.
///
/// The exactness ladder is mutually damped (a K2 hit contributes
/// nothing once K3 fired, and so on); the texture terms are additive.
/// Rarity contributes only when some tail predicate fired.
pub fn weighted_score(m: &MatchResult, kr: f64, w: &ScoreWeights) -> f64 {
    let k3 = if m.k3 { 1.0 } else { 0.0 };
    let k2 = if m.k2 { 1.0 } else { 0.0 };
    let k2_5 = if m.k2_5 { 1.0 } else { 0.0 };

    let mut wrs = w.k3 * k3
        + w.k2 * (1.0 - k3) * k2
        + w.k2_5 * (1.0 - k3) * (1.0 - k2) * k2_5
        + w.k1 * (1.0 - k3) * (1.0 - k2) * (1.0 - k2_5) * m.k1
        + w.kc * m.kc
        + w.kf * m.kf
        + w.kp * m.kp
        + w.km * m.km.min(1.0)
        + m.k0;
    if m.any_tail_match() {
        wrs += w.kr * kr.clamp(0.0, 1.0);
    }

    if family_agreement(m) >= 2 {
        wrs += AGREEMENT_BONUS;
    }

    apply_overrides(wrs, m)
}

/// Downweight applied by word-level evaluation when pronunciation
/// variants disagree on classification. Bounded: the result stays in
/// [0, 1] and the perfect floor survives.
pub fn downweight_for_ambiguity(wrs: f64, m: &MatchResult) -> f64 {
    apply_overrides(wrs - AMBIGUITY_PENALTY, m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> MatchResult {
        MatchResult::none()
    }

    #[test]
    fn test_none_scores_zero() {
        let m = base();
        assert_eq!(weighted_score(&m, 0.9, &ScoreWeights::default()), 0.0);
    }

    #[test]
    fn test_k3_floor() {
        let mut m = base();
        m.k3 = true;
        m.k2 = true;
        m.class = crate::types::RhymeClass::Perfect;
        let wrs = weighted_score(&m, 0.0, &ScoreWeights::default());
        assert!(wrs >= 0.95);
        assert!(wrs <= 1.0);
    }

    #[test]
    fn test_k2_weight() {
        let mut m = base();
        m.k2 = true;
        m.k1 = 1.0;
        m.class = crate::types::RhymeClass::LoosePerfect;
        let wrs = weighted_score(&m, 0.0, &ScoreWeights::default());
        // 0.85 for K2; K1 damped by the K2 hit; +0.03 family agreement
        assert!((wrs - 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_k1_damped_by_stronger_tiers() {
        let mut m = base();
        m.k1 = 1.0;
        m.class = crate::types::RhymeClass::Assonance;
        let alone = weighted_score(&m, 0.0, &ScoreWeights::default());
        assert!((alone - 0.35).abs() < 1e-9);

        m.k2_5 = true;
        m.class = crate::types::RhymeClass::Terminal;
        let with_terminal = weighted_score(&m, 0.0, &ScoreWeights::default());
        // 0.60 + 0.03 agreement, K1 fully damped
        assert!((with_terminal - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_rarity_gated_on_tail_match() {
        let mut m = base();
        m.k0 = 0.25;
        m.class = crate::types::RhymeClass::UpstreamOnly;
        // Upstream-only: rarity must not lift the score out of its band
        let wrs = weighted_score(&m, 1.0, &ScoreWeights::default());
        assert!((wrs - 0.25).abs() < 1e-9);

        m.k1 = 1.0;
        m.class = crate::types::RhymeClass::Assonance;
        let with_rarity = weighted_score(&m, 1.0, &ScoreWeights::default());
        // 0.35 + 0.25 upstream + 0.20 rarity; K1 and K0 are one family,
        // so no agreement bonus
        assert!((with_rarity - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_eye_rhyme_zero() {
        let mut m = base();
        m.kc = 1.0;
        m.class = crate::types::RhymeClass::EyeRhymeExcluded;
        assert_eq!(weighted_score(&m, 1.0, &ScoreWeights::default()), 0.0);
        assert_eq!(downweight_for_ambiguity(0.5, &m), 0.0);
    }

    #[test]
    fn test_clamped() {
        let mut m = base();
        m.k3 = true;
        m.k2 = true;
        m.k2_5 = true;
        m.k1 = 1.0;
        m.kc = 1.0;
        m.kf = 1.0;
        m.kp = 1.0;
        m.km = 1.0;
        m.k0 = 0.25;
        m.class = crate::types::RhymeClass::Perfect;
        let wrs = weighted_score(&m, 1.0, &ScoreWeights::default());
        assert!(wrs <= 1.0);
    }

    #[test]
    fn test_ambiguity_downweight_respects_floor() {
        let mut m = base();
        m.k3 = true;
        m.class = crate::types::RhymeClass::Perfect;
        let wrs = weighted_score(&m, 0.0, &ScoreWeights::default());
        assert!(downweight_for_ambiguity(wrs, &m) >= 0.95);

        let mut weak = base();
        weak.k1 = 1.0;
        weak.class = crate::types::RhymeClass::Assonance;
        let wrs = weighted_score(&weak, 0.0, &ScoreWeights::default());
        let adjusted = downweight_for_ambiguity(wrs, &weak);
        assert!((adjusted - (wrs - 0.05)).abs() < 1e-9);
    }
}
