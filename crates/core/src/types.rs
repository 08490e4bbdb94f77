//! Core value types: transcriptions, tails, match records, classes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AmbiguityWarning, RhymeError};
use crate::phonetics::features;

/// One pronunciation of a word (or of the final content word of a
/// phrase) as an ordered sequence of ARPABET phones.
///
/// Phones are validated at construction; an empty transcription is
/// representable and evaluates to [`RhymeClass::None`] with WRS 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transcription {
    phones: Vec<String>,
}

impl Transcription {
    /// Parse a space-separated ARPABET string, e.g. `"W IH0 DH AW1 T"`.
    pub fn parse(s: &str) -> Result<Self, RhymeError> {
        Self::from_phones(s.split_whitespace().map(str::to_string).collect())
    }

    /// Build from pre-split phones, validating every symbol.
    pub fn from_phones(phones: Vec<String>) -> Result<Self, RhymeError> {
        for p in &phones {
            features::validate(p)?;
        }
        Ok(Self { phones })
    }

    /// The empty transcription: evaluates to no rhyme at all.
    pub fn empty() -> Self {
        Self { phones: Vec::new() }
    }

    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    /// Phones with stress digits removed.
    pub fn stripped(&self) -> Vec<String> {
        self.phones
            .iter()
            .map(|p| features::strip_stress(p).to_string())
            .collect()
    }

    /// Number of syllables (= number of vowel phones).
    pub fn syllable_count(&self) -> usize {
        self.phones.iter().filter(|p| features::is_vowel(p)).count()
    }

    /// Concatenate two transcriptions (phrase spans).
    pub fn join(&self, other: &Transcription) -> Transcription {
        let mut phones = self.phones.clone();
        phones.extend(other.phones.iter().cloned());
        Transcription { phones }
    }
}

impl fmt::Display for Transcription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phones.join(" "))
    }
}

/// The rhyme-relevant suffix of a transcription: the phones from a
/// stressed vowel (inclusive) through the end, stress digits retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tail {
    pub phones: Vec<String>,
    /// Index of the tail's first phone within the source transcription.
    pub start: usize,
}

impl Tail {
    /// The stressed vowel the tail begins with.
    pub fn nucleus(&self) -> &str {
        &self.phones[0]
    }

    /// Tail phones with stress digits removed.
    pub fn stripped(&self) -> Vec<String> {
        self.phones
            .iter()
            .map(|p| features::strip_stress(p).to_string())
            .collect()
    }

    pub fn syllable_count(&self) -> usize {
        self.phones.iter().filter(|p| features::is_vowel(p)).count()
    }
}

impl fmt::Display for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phones.join(" "))
    }
}

/// Normalized rhyme-tail class: the stressed vowel's base quality plus
/// the stress-stripped coda of its syllable. The key for rarity lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TailClass {
    pub nucleus: String,
    pub coda: Vec<String>,
}

impl fmt::Display for TailClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coda.is_empty() {
            write!(f, "{}", self.nucleus)
        } else {
            write!(f, "{}-{}", self.nucleus, self.coda.join("-"))
        }
    }
}

/// Closed taxonomy of rhyme relations between two transcriptions.
///
/// Selection is total: every pair resolves to exactly one class, with
/// [`RhymeClass::None`] as the default when nothing fires. The priority
/// function lives in `rhyme::evaluate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhymeClass {
    Perfect,
    LoosePerfect,
    Terminal,
    Assonance,
    Consonance,
    Pararhyme,
    Family,
    Multisyllabic,
    UpstreamOnly,
    Wrenched,
    EyeRhymeExcluded,
    Homophone,
    None,
}

impl RhymeClass {
    /// Coarse strength ordering used for best-of reporting. Higher is
    /// stronger; excluded and empty classes rank zero.
    pub fn rank(&self) -> u8 {
        match self {
            RhymeClass::Perfect | RhymeClass::Homophone => 10,
            RhymeClass::LoosePerfect => 9,
            RhymeClass::Multisyllabic => 8,
            RhymeClass::Terminal => 7,
            RhymeClass::Wrenched => 6,
            RhymeClass::Family => 5,
            RhymeClass::Assonance => 4,
            RhymeClass::Pararhyme => 3,
            RhymeClass::Consonance => 3,
            RhymeClass::UpstreamOnly => 1,
            RhymeClass::EyeRhymeExcluded | RhymeClass::None => 0,
        }
    }
}

impl fmt::Display for RhymeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RhymeClass::Perfect => "perfect",
            RhymeClass::LoosePerfect => "loose_perfect",
            RhymeClass::Terminal => "terminal",
            RhymeClass::Assonance => "assonance",
            RhymeClass::Consonance => "consonance",
            RhymeClass::Pararhyme => "pararhyme",
            RhymeClass::Family => "family",
            RhymeClass::Multisyllabic => "multisyllabic",
            RhymeClass::UpstreamOnly => "upstream_only",
            RhymeClass::Wrenched => "wrenched",
            RhymeClass::EyeRhymeExcluded => "eye_rhyme_excluded",
            RhymeClass::Homophone => "homophone",
            RhymeClass::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// All categorical and continuous predicate values for one pair, plus
/// the winning class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Strict perfect: tails equal including stress digits.
    pub k3: bool,
    /// Loose perfect: tails equal after stripping stress.
    pub k2: bool,
    /// Terminal: final-syllable rimes equal while full tails differ.
    pub k2_5: bool,
    /// Tail assonance: stressed-vowel quality equal.
    pub k1: f64,
    /// Upstream assonance contribution, 0 or within [0.10, 0.25].
    pub k0: f64,
    /// Coda consonance overlap.
    pub kc: f64,
    /// Family (feature-class) coda overlap.
    pub kf: f64,
    /// Pararhyme frame score.
    pub kp: f64,
    /// Multisyllabic continuity ratio.
    pub km: f64,
    pub class: RhymeClass,
}

impl MatchResult {
    /// A result where nothing fired at all.
    pub fn none() -> Self {
        MatchResult {
            k3: false,
            k2: false,
            k2_5: false,
            k1: 0.0,
            k0: 0.0,
            kc: 0.0,
            kf: 0.0,
            kp: 0.0,
            km: 0.0,
            class: RhymeClass::None,
        }
    }

    /// True when any tail-matching predicate fired. Gates the rarity
    /// contribution: rarity rewards rare rhymes, not rare non-rhymes.
    pub fn any_tail_match(&self) -> bool {
        self.k3
            || self.k2
            || self.k2_5
            || self.k1 > 0.0
            || self.kc > 0.0
            || self.kf > 0.0
            || self.kp > 0.0
            || self.km > 0.0
    }

    /// Loose-perfect or better: the threshold flow density counts.
    pub fn at_least_loose(&self) -> bool {
        self.k3 || self.k2
    }
}

/// Pairwise evaluation output: predicate record, weighted score, and a
/// human-readable account of which predicates fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub matches: MatchResult,
    pub wrs: f64,
    pub explanation: String,
}

impl Evaluation {
    pub fn class(&self) -> RhymeClass {
        self.matches.class
    }
}

/// Word-level evaluation: the strongest variant pair, plus any
/// ambiguity notice when variants disagreed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEvaluation {
    pub evaluation: Evaluation,
    pub pron_a: Transcription,
    pub pron_b: Transcription,
    pub warning: Option<AmbiguityWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let t = Transcription::parse("W IH0 DH AW1 T").unwrap();
        assert_eq!(t.phones().len(), 5);
        assert_eq!(t.syllable_count(), 2);
        assert_eq!(t.to_string(), "W IH0 DH AW1 T");
    }

    #[test]
    fn test_parse_empty_is_ok() {
        let t = Transcription::parse("").unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_parse_unknown_phone() {
        assert!(Transcription::parse("W QX T").is_err());
    }

    #[test]
    fn test_parse_malformed_stress() {
        assert!(Transcription::parse("K1 AE1 T").is_err());
        assert!(Transcription::parse("K AE7 T").is_err());
    }

    #[test]
    fn test_stripped() {
        let t = Transcription::parse("D IH0 V AW1 T").unwrap();
        assert_eq!(t.stripped(), vec!["D", "IH", "V", "AW", "T"]);
    }

    #[test]
    fn test_join() {
        let a = Transcription::parse("DH AH0").unwrap();
        let b = Transcription::parse("K AE1 T").unwrap();
        assert_eq!(a.join(&b).to_string(), "DH AH0 K AE1 T");
    }

    #[test]
    fn test_tail_class_display() {
        let tc = TailClass { nucleus: "AW".into(), coda: vec!["T".into()] };
        assert_eq!(tc.to_string(), "AW-T");
        let open = TailClass { nucleus: "IY".into(), coda: vec![] };
        assert_eq!(open.to_string(), "IY");
    }

    #[test]
    fn test_class_rank_ordering() {
        assert!(RhymeClass::Perfect.rank() > RhymeClass::LoosePerfect.rank());
        assert!(RhymeClass::LoosePerfect.rank() > RhymeClass::Terminal.rank());
        assert!(RhymeClass::Assonance.rank() > RhymeClass::UpstreamOnly.rank());
        assert_eq!(RhymeClass::None.rank(), 0);
        assert_eq!(RhymeClass::EyeRhymeExcluded.rank(), 0);
    }

    #[test]
    fn test_class_serde_snake_case() {
        let json = serde_json::to_string(&RhymeClass::LoosePerfect).unwrap();
        assert_eq!(json, "\"loose_perfect\"");
        let back: RhymeClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RhymeClass::LoosePerfect);
    }

    #[test]
    fn test_match_result_none() {
        let m = MatchResult::none();
        assert!(!m.any_tail_match());
        assert_eq!(m.class, RhymeClass::None);
    }
}
