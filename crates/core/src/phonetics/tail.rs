//! Rhyme-tail extraction.
//!
//! The strict tail runs from the last primary-stressed vowel to the end
//! of the transcription. When no primary stress exists the strict tail
//! is undefined; looser comparisons fall back to the last secondary-
//! stressed vowel, then to the last vowel of any stress.

use crate::phonetics::features::{self, strip_stress, stress_digit};
use crate::phonetics::syllabify::syllabify;
use crate::types::{Tail, TailClass, Transcription};

fn tail_from(t: &Transcription, start: usize) -> Tail {
    Tail {
        phones: t.phones()[start..].to_vec(),
        start,
    }
}

fn last_vowel_where(t: &Transcription, pred: impl Fn(&str) -> bool) -> Option<usize> {
    t.phones()
        .iter()
        .enumerate()
        .rev()
        .find(|&(_, p)| features::is_vowel(p) && pred(p))
        .map(|(i, _)| i)
}

/// Tail from the last primary-stressed vowel, or `None` when the
/// transcription carries no primary stress.
pub fn strict_tail(t: &Transcription) -> Option<Tail> {
    last_vowel_where(t, |p| stress_digit(p) == Some(1)).map(|i| tail_from(t, i))
}

/// Fallback tail: last secondary-stressed vowel, else last vowel of any
/// stress. `None` only for vowel-less transcriptions.
pub fn loose_tail(t: &Transcription) -> Option<Tail> {
    last_vowel_where(t, |p| matches!(stress_digit(p), Some(1) | Some(2)))
        .or_else(|| last_vowel_where(t, |_| true))
        .map(|i| tail_from(t, i))
}

/// The tail loose comparisons operate on: strict when defined, else the
/// documented fallback.
pub fn effective_tail(t: &Transcription) -> Option<Tail> {
    strict_tail(t).or_else(|| loose_tail(t))
}

/// Stress-stripped nucleus + coda of the final syllable.
pub fn final_rime(t: &Transcription) -> Option<Vec<String>> {
    let syls = syllabify(t.phones(), true).ok()?;
    syls.last().map(|s| s.rime_stripped())
}

/// Normalized rarity key for a transcription's tail: the stressed
/// vowel's base quality plus its syllable coda (consonants up to the
/// next vowel), stress-stripped.
pub fn tail_class(t: &Transcription) -> Option<TailClass> {
    let tail = effective_tail(t)?;
    let nucleus = strip_stress(tail.nucleus()).to_string();
    let coda: Vec<String> = tail.phones[1..]
        .iter()
        .take_while(|p| !features::is_vowel(p))
        .map(|p| strip_stress(p).to_string())
        .collect();
    Some(TailClass { nucleus, coda })
}

/// Stripped vowel qualities strictly before the tail start.
pub fn upstream_vowels(t: &Transcription, tail_start: usize) -> Vec<String> {
    t.phones()[..tail_start]
        .iter()
        .filter(|p| features::is_vowel(p))
        .map(|p| strip_stress(p).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Transcription {
        Transcription::parse(s).unwrap()
    }

    #[test]
    fn test_strict_tail() {
        let tail = strict_tail(&t("W IH0 DH AW1 T")).unwrap();
        assert_eq!(tail.phones, vec!["AW1", "T"]);
        assert_eq!(tail.start, 3);
        assert_eq!(tail.nucleus(), "AW1");
    }

    #[test]
    fn test_strict_tail_undefined_without_primary() {
        assert!(strict_tail(&t("DH AH0")).is_none());
        assert!(strict_tail(&t("")).is_none());
    }

    #[test]
    fn test_strict_tail_multisyllabic() {
        // Primary stress before the final syllable keeps the whole suffix
        let tail = strict_tail(&t("W ER1 K AW2 T")).unwrap();
        assert_eq!(tail.phones, vec!["ER1", "K", "AW2", "T"]);
        assert_eq!(tail.syllable_count(), 2);
    }

    #[test]
    fn test_loose_tail_prefers_secondary() {
        let tail = loose_tail(&t("AH0 B AW2 T")).unwrap();
        assert_eq!(tail.phones, vec!["AW2", "T"]);
    }

    #[test]
    fn test_loose_tail_any_vowel_fallback() {
        let tail = loose_tail(&t("DH AH0")).unwrap();
        assert_eq!(tail.phones, vec!["AH0"]);
    }

    #[test]
    fn test_effective_tail_falls_back() {
        assert_eq!(effective_tail(&t("AH0 B AW2 T")).unwrap().phones, vec!["AW2", "T"]);
        assert_eq!(effective_tail(&t("D IH0 V AW1 T")).unwrap().phones, vec!["AW1", "T"]);
    }

    #[test]
    fn test_final_rime() {
        assert_eq!(final_rime(&t("S T EY1 K AW2 T")).unwrap(), vec!["AW", "T"]);
        assert_eq!(final_rime(&t("D IH0 Z AY1 N ER0")).unwrap(), vec!["ER"]);
        assert!(final_rime(&t("")).is_none());
    }

    #[test]
    fn test_tail_class() {
        let tc = tail_class(&t("W IH0 DH AW1 T")).unwrap();
        assert_eq!(tc.nucleus, "AW");
        assert_eq!(tc.coda, vec!["T"]);

        // Coda stops at the next vowel
        let tc = tail_class(&t("D IH0 Z AY1 N ER0")).unwrap();
        assert_eq!(tc.nucleus, "AY");
        assert_eq!(tc.coda, vec!["N"]);
    }

    #[test]
    fn test_upstream_vowels() {
        let tr = t("G IH0 T AA1 R");
        let tail = strict_tail(&tr).unwrap();
        assert_eq!(upstream_vowels(&tr, tail.start), vec!["IH"]);
    }

    #[test]
    fn test_tail_deterministic() {
        let tr = t("D IH0 V AW1 T");
        assert_eq!(strict_tail(&tr), strict_tail(&tr));
    }
}
