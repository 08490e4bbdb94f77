//! ARPABET phoneme feature tables.
//!
//! Static articulatory classification: vowels by height/backness/rounding,
//! consonants by place/manner/voicing. Tables are seeded once and never
//! mutated; unknown symbols are an error, never defaulted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, PhoneticError, RhymeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Height {
    High,
    Mid,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backness {
    Front,
    Central,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    Rounded,
    Unrounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Place {
    Bilabial,
    Labiodental,
    Dental,
    Alveolar,
    Postalveolar,
    Palatal,
    Velar,
    Glottal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Manner {
    Stop,
    Affricate,
    Fricative,
    Nasal,
    Liquid,
    Glide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voicing {
    Voiced,
    Voiceless,
}

/// Articulatory feature vector for one phoneme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Features {
    Vowel {
        height: Height,
        backness: Backness,
        rounding: Rounding,
    },
    Consonant {
        place: Place,
        manner: Manner,
        voicing: Voicing,
    },
}

impl Features {
    pub fn is_vowel(&self) -> bool {
        matches!(self, Features::Vowel { .. })
    }
}

lazy_static::lazy_static! {
    /// Articulatory features for each ARPABET base symbol.
    static ref FEATURES: HashMap<&'static str, Features> = {
        use Backness::*;
        use Height::*;
        use Manner::*;
        use Place::*;
        use Rounding::*;
        use Voicing::*;

        let v = |height, backness, rounding| Features::Vowel { height, backness, rounding };
        let c = |place, manner, voicing| Features::Consonant { place, manner, voicing };

        let mut m = HashMap::new();
        // Vowels
        m.insert("IY", v(High, Front, Unrounded));
        m.insert("IH", v(High, Front, Unrounded));
        m.insert("EY", v(Mid, Front, Unrounded));
        m.insert("EH", v(Mid, Front, Unrounded));
        m.insert("AE", v(Low, Front, Unrounded));
        m.insert("AA", v(Low, Back, Unrounded));
        m.insert("AH", v(Mid, Central, Unrounded));
        m.insert("AO", v(Mid, Back, Rounded));
        m.insert("OW", v(Mid, Back, Rounded));
        m.insert("UH", v(High, Back, Rounded));
        m.insert("UW", v(High, Back, Rounded));
        m.insert("AW", v(Low, Central, Unrounded));
        m.insert("AY", v(Low, Central, Unrounded));
        m.insert("OY", v(Mid, Back, Rounded));
        m.insert("ER", v(Mid, Central, Rounded));
        // Stops
        m.insert("P", c(Bilabial, Stop, Voiceless));
        m.insert("B", c(Bilabial, Stop, Voiced));
        m.insert("T", c(Alveolar, Stop, Voiceless));
        m.insert("D", c(Alveolar, Stop, Voiced));
        m.insert("K", c(Velar, Stop, Voiceless));
        m.insert("G", c(Velar, Stop, Voiced));
        // Affricates
        m.insert("CH", c(Postalveolar, Affricate, Voiceless));
        m.insert("JH", c(Postalveolar, Affricate, Voiced));
        // Fricatives
        m.insert("F", c(Labiodental, Fricative, Voiceless));
        m.insert("V", c(Labiodental, Fricative, Voiced));
        m.insert("TH", c(Dental, Fricative, Voiceless));
        m.insert("DH", c(Dental, Fricative, Voiced));
        m.insert("S", c(Alveolar, Fricative, Voiceless));
        m.insert("Z", c(Alveolar, Fricative, Voiced));
        m.insert("SH", c(Postalveolar, Fricative, Voiceless));
        m.insert("ZH", c(Postalveolar, Fricative, Voiced));
        m.insert("HH", c(Glottal, Fricative, Voiceless));
        // Nasals
        m.insert("M", c(Bilabial, Nasal, Voiced));
        m.insert("N", c(Alveolar, Nasal, Voiced));
        m.insert("NG", c(Velar, Nasal, Voiced));
        // Liquids
        m.insert("L", c(Alveolar, Liquid, Voiced));
        m.insert("R", c(Postalveolar, Liquid, Voiced));
        // Glides
        m.insert("W", c(Bilabial, Glide, Voiced));
        m.insert("Y", c(Palatal, Glide, Voiced));
        m
    };
}

/// Strip trailing stress digits from an ARPABET phone.
pub fn strip_stress(phone: &str) -> &str {
    phone.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Stress digit of a phone, if it carries one.
pub fn stress_digit(phone: &str) -> Option<u8> {
    phone
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}

/// Classify a phone symbol, ignoring any stress digit.
pub fn classify(phone: &str) -> Result<Features, PhoneticError> {
    let base = strip_stress(phone);
    FEATURES
        .get(base)
        .copied()
        .ok_or_else(|| PhoneticError::UnknownSymbol(phone.to_string()))
}

/// Validate a phone symbol: known base, well-formed stress digit.
pub fn validate(phone: &str) -> Result<(), RhymeError> {
    let base = strip_stress(phone);
    let digits = &phone[base.len()..];
    if digits.len() > 1 {
        return Err(InputError::Malformed(phone.to_string(), "multiple stress digits".into()).into());
    }
    let features = classify(phone)?;
    if let Some(d) = stress_digit(phone) {
        if d > 2 {
            return Err(InputError::Malformed(phone.to_string(), "stress digit out of range".into()).into());
        }
        if !features.is_vowel() {
            return Err(InputError::Malformed(phone.to_string(), "stress digit on a consonant".into()).into());
        }
    }
    Ok(())
}

/// True for vowel phones (with or without stress digit).
pub fn is_vowel(phone: &str) -> bool {
    classify(phone).map(|f| f.is_vowel()).unwrap_or(false)
}

/// Count of differing vowel features between two vowel phones (0..=3).
///
/// Non-vowel or unknown input counts as maximally distant.
pub fn vowel_distance(a: &str, b: &str) -> usize {
    match (classify(a), classify(b)) {
        (
            Ok(Features::Vowel { height: ha, backness: ba, rounding: ra }),
            Ok(Features::Vowel { height: hb, backness: bb, rounding: rb }),
        ) => [ha != hb, ba != bb, ra != rb].iter().filter(|&&d| d).count(),
        _ => 3,
    }
}

/// True when two consonants belong to the same family: identical, or
/// sharing both manner and voicing (e.g. T/P, Z/V).
pub fn same_family(a: &str, b: &str) -> bool {
    let a = strip_stress(a);
    let b = strip_stress(b);
    if a == b {
        return true;
    }
    match (classify(a), classify(b)) {
        (
            Ok(Features::Consonant { manner: ma, voicing: va, .. }),
            Ok(Features::Consonant { manner: mb, voicing: vb, .. }),
        ) => ma == mb && va == vb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_vowel() {
        let f = classify("AE1").unwrap();
        assert!(f.is_vowel());
        assert_eq!(
            f,
            Features::Vowel {
                height: Height::Low,
                backness: Backness::Front,
                rounding: Rounding::Unrounded
            }
        );
    }

    #[test]
    fn test_classify_consonant() {
        let f = classify("DH").unwrap();
        assert_eq!(
            f,
            Features::Consonant {
                place: Place::Dental,
                manner: Manner::Fricative,
                voicing: Voicing::Voiced
            }
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert!(classify("QX").is_err());
        assert!(classify("").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_stress() {
        assert!(validate("AE1").is_ok());
        assert!(validate("K").is_ok());
        assert!(validate("AE3").is_err()); // digit out of range
        assert!(validate("K1").is_err()); // stress on consonant
        assert!(validate("AE12").is_err()); // two digits
        assert!(validate("QX").is_err()); // unknown base
    }

    #[test]
    fn test_strip_and_digit() {
        assert_eq!(strip_stress("AW1"), "AW");
        assert_eq!(strip_stress("K"), "K");
        assert_eq!(stress_digit("AW1"), Some(1));
        assert_eq!(stress_digit("K"), None);
    }

    #[test]
    fn test_vowel_distance() {
        assert_eq!(vowel_distance("AE1", "AE2"), 0); // stress ignored
        assert_eq!(vowel_distance("IY", "IH"), 0); // same quality triple
        assert_eq!(vowel_distance("EH", "AO"), 2); // backness + rounding
        assert_eq!(vowel_distance("IY", "AA"), 2); // height + backness
        assert_eq!(vowel_distance("K", "AE"), 3); // consonant = max distance
    }

    #[test]
    fn test_same_family() {
        assert!(same_family("T", "P")); // voiceless stops
        assert!(same_family("Z", "V")); // voiced fricatives
        assert!(same_family("M", "NG")); // nasals
        assert!(!same_family("T", "D")); // voicing differs
        assert!(!same_family("T", "S")); // manner differs
        assert!(!same_family("T", "AE")); // not a consonant pair
    }
}
