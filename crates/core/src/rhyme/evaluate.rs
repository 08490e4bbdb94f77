//! Match predicates and the rhyme classification function.
//!
//! Predicates are computed symmetrically from the two transcriptions;
//! classification is total, with an explicit priority function over the
//! closed class taxonomy.

use std::collections::BTreeSet;

use crate::phonetics::features::{is_vowel, same_family, strip_stress, vowel_distance};
use crate::phonetics::syllabify::{syllabify, Syllable};
use crate::phonetics::tail::{effective_tail, final_rime, strict_tail, upstream_vowels};
use crate::types::{MatchResult, RhymeClass, Transcription};

/// Minimum coda overlap for a Consonance classification.
const MIN_CONSONANCE: f64 = 0.5;
/// Minimum family overlap for a Family classification.
const MIN_FAMILY: f64 = 0.5;
/// Syllable-run length at which a terminal match becomes multisyllabic.
const MULTISYLLABIC_RUN: usize = 2;
/// Shared spelling suffix that makes a non-rhyming pair an eye rhyme.
const EYE_SUFFIX_LEN: usize = 3;
/// Upstream assonance contribution bounds.
const K0_BASE: f64 = 0.10;
const K0_SPAN: f64 = 0.15;

/// Evaluate all predicates for a pair of transcriptions.
///
/// Spelling-based overrides (homophone, eye-rhyme exclusion) need the
/// word forms and only apply through [`evaluate_with_spellings`].
pub fn evaluate_transcriptions(a: &Transcription, b: &Transcription) -> MatchResult {
    compute(a, b, None)
}

/// Evaluate a pair with spellings available for the homophone and
/// eye-rhyme overrides.
pub fn evaluate_with_spellings(
    a: &Transcription,
    b: &Transcription,
    spelling_a: &str,
    spelling_b: &str,
) -> MatchResult {
    compute(a, b, Some((spelling_a, spelling_b)))
}

fn compute(a: &Transcription, b: &Transcription, spellings: Option<(&str, &str)>) -> MatchResult {
    if a.is_empty() || b.is_empty() {
        return MatchResult::none();
    }

    let mut m = MatchResult::none();

    let strict_a = strict_tail(a);
    let strict_b = strict_tail(b);
    m.k3 = match (&strict_a, &strict_b) {
        (Some(ta), Some(tb)) => ta.phones == tb.phones,
        _ => false,
    };

    // Vowel-less transcriptions have no tail to compare
    let (eff_a, eff_b) = match (effective_tail(a), effective_tail(b)) {
        (Some(ta), Some(tb)) => (ta, tb),
        _ => return m,
    };

    m.k2 = eff_a.stripped() == eff_b.stripped();

    let rime_a = final_rime(a);
    let rime_b = final_rime(b);
    m.k2_5 = match (&rime_a, &rime_b) {
        (Some(ra), Some(rb)) => ra == rb,
        _ => false,
    };

    m.k1 = if strip_stress(eff_a.nucleus()) == strip_stress(eff_b.nucleus()) {
        1.0
    } else {
        0.0
    };

    let syls_a = syllabify(a.phones(), true).unwrap_or_default();
    let syls_b = syllabify(b.phones(), true).unwrap_or_default();

    // Multisyllabic continuity: consecutive rime matches from the end
    let considered = syls_a.len().min(syls_b.len());
    let mut run = 0;
    for i in 1..=considered {
        if syls_a[syls_a.len() - i].rime_stripped() == syls_b[syls_b.len() - i].rime_stripped() {
            run += 1;
        } else {
            break;
        }
    }
    if considered > 0 {
        m.km = (run as f64 / considered as f64).min(1.0);
    }

    // Final-coda comparisons
    if let (Some(last_a), Some(last_b)) = (syls_a.last(), syls_b.last()) {
        let coda_a = last_a.coda_stripped();
        let coda_b = last_b.coda_stripped();
        if !coda_a.is_empty() && !coda_b.is_empty() {
            if m.k1 == 0.0 {
                m.kc = coda_overlap(&coda_a, &coda_b);
            } else {
                m.kf = family_overlap(&coda_a, &coda_b);
            }
        }
    }

    // Pararhyme: equal consonant frame around differing nuclei
    if m.k1 == 0.0 {
        if let (Some(fa), Some(fb)) = (
            stressed_syllable(&syls_a, eff_a.start, a),
            stressed_syllable(&syls_b, eff_b.start, b),
        ) {
            let frame_a = frame(fa);
            let frame_b = frame(fb);
            let has_frame = !(frame_a.0.is_empty() && frame_a.1.is_empty());
            if has_frame && frame_a == frame_b {
                let dist = vowel_distance(eff_a.nucleus(), eff_b.nucleus());
                m.kp = 1.0 - dist as f64 / 3.0;
            }
        }
    }

    // Upstream assonance: shared vowel qualities before the tail
    let up_a: BTreeSet<String> = upstream_vowels(a, eff_a.start).into_iter().collect();
    let up_b: BTreeSet<String> = upstream_vowels(b, eff_b.start).into_iter().collect();
    let shared = up_a.intersection(&up_b).count();
    if shared > 0 {
        let denom = up_a.len().max(up_b.len()) as f64;
        m.k0 = K0_BASE + K0_SPAN * shared as f64 / denom;
    }

    m.class = classify(&m, run, &syls_a, &syls_b, a, b, spellings);
    log::debug!("classified {} / {} as {}", a, b, m.class);
    m
}

/// Total classification with explicit priority. First match wins; each
/// class below Perfect requires strictly less evidence than the ones
/// above it.
#[allow(clippy::too_many_arguments)]
fn classify(
    m: &MatchResult,
    run: usize,
    syls_a: &[Syllable],
    syls_b: &[Syllable],
    a: &Transcription,
    b: &Transcription,
    spellings: Option<(&str, &str)>,
) -> RhymeClass {
    if let Some((sa, sb)) = spellings {
        let distinct = !sa.eq_ignore_ascii_case(sb);
        if distinct && a.stripped() == b.stripped() {
            return RhymeClass::Homophone;
        }
        let no_nucleus_agreement = !m.k3 && !m.k2 && !m.k2_5 && m.k1 == 0.0 && run == 0;
        if no_nucleus_agreement && common_suffix_len(sa, sb) >= EYE_SUFFIX_LEN {
            return RhymeClass::EyeRhymeExcluded;
        }
    }

    if m.k3 {
        return RhymeClass::Perfect;
    }
    if m.k2 {
        return RhymeClass::LoosePerfect;
    }
    if m.k2_5 {
        if run >= MULTISYLLABIC_RUN {
            return RhymeClass::Multisyllabic;
        }
        let stressed = |syls: &[Syllable]| {
            syls.last()
                .and_then(|s| s.stress())
                .map(|d| d > 0)
                .unwrap_or(false)
        };
        return if stressed(syls_a) == stressed(syls_b) {
            RhymeClass::Terminal
        } else {
            // The rhyme only works by distorting one side's stress
            RhymeClass::Wrenched
        };
    }
    if m.k1 > 0.0 {
        return if m.kf >= MIN_FAMILY {
            RhymeClass::Family
        } else {
            RhymeClass::Assonance
        };
    }
    if m.kp > 0.0 {
        return RhymeClass::Pararhyme;
    }
    if m.kc >= MIN_CONSONANCE {
        return RhymeClass::Consonance;
    }
    if m.k0 > 0.0 {
        return RhymeClass::UpstreamOnly;
    }
    RhymeClass::None
}

/// The syllable containing the tail vowel: its index equals the number
/// of vowels before the tail start.
fn stressed_syllable<'a>(
    syls: &'a [Syllable],
    tail_start: usize,
    t: &Transcription,
) -> Option<&'a Syllable> {
    let idx = t.phones()[..tail_start]
        .iter()
        .filter(|p| is_vowel(p))
        .count();
    syls.get(idx)
}

/// Onset and coda consonant frame of a syllable. Glides pulled into the
/// nucleus count toward the onset side, R-coloring toward the coda.
fn frame(s: &Syllable) -> (Vec<String>, Vec<String>) {
    let strip = |p: &String| strip_stress(p).to_string();
    let vowel_at = s.nucleus.iter().position(|p| is_vowel(p)).unwrap_or(0);
    let mut onset = s.onset_stripped();
    onset.extend(s.nucleus[..vowel_at].iter().map(strip));
    let mut coda: Vec<String> = s.nucleus[vowel_at + 1..].iter().map(strip).collect();
    coda.extend(s.coda_stripped());
    (onset, coda)
}

/// Order-aware coda overlap: mean of the longest-common-subsequence
/// ratio and the longest-contiguous-cluster ratio, so longer matching
/// clusters score higher than scattered single matches.
fn coda_overlap(a: &[String], b: &[String]) -> f64 {
    let n = a.len().max(b.len()) as f64;
    let subseq = lcs_len(a, b) as f64;
    let contig = longest_common_cluster(a, b) as f64;
    (subseq + contig) / (2.0 * n)
}

/// End-aligned ratio of family-equivalent coda positions.
fn family_overlap(a: &[String], b: &[String]) -> f64 {
    let n = a.len().max(b.len());
    let matched = (1..=a.len().min(b.len()))
        .filter(|&i| same_family(&a[a.len() - i], &b[b.len() - i]))
        .count();
    matched as f64 / n as f64
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }
    dp[a.len()][b.len()]
}

fn longest_common_cluster(a: &[String], b: &[String]) -> usize {
    let mut best = 0;
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
                best = best.max(dp[i][j]);
            }
        }
    }
    best
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x.eq_ignore_ascii_case(y))
        .count()
}

/// Human-readable account of which predicates fired.
pub fn explain(m: &MatchResult, a: &Transcription, b: &Transcription) -> String {
    let mut notes: Vec<String> = Vec::new();
    if m.class == RhymeClass::EyeRhymeExcluded {
        notes.push("spelling-only likeness, no shared nucleus".to_string());
    }
    if m.k3 {
        if let Some(tail) = strict_tail(a) {
            notes.push(format!("strict tails match ({})", tail));
        }
    } else if m.k2 {
        if let Some(tail) = effective_tail(a) {
            notes.push(format!("tails match ignoring stress ({})", tail.stripped().join(" ")));
        }
    } else if m.k2_5 {
        if let Some(rime) = final_rime(a) {
            notes.push(format!("final rimes match ({})", rime.join(" ")));
        }
    }
    if m.k1 > 0.0 && !m.k3 && !m.k2 {
        if let Some(tail) = effective_tail(a) {
            notes.push(format!("stressed vowels share {}", strip_stress(tail.nucleus())));
        }
    }
    if m.kc > 0.0 {
        notes.push(format!("coda overlap {:.2}", m.kc));
    }
    if m.kf > 0.0 {
        notes.push(format!("coda family overlap {:.2}", m.kf));
    }
    if m.kp > 0.0 {
        notes.push("consonant frame matches around differing vowels".to_string());
    }
    if m.km > 0.0 {
        notes.push(format!("syllable continuity {:.2}", m.km));
    }
    if m.k0 > 0.0 {
        notes.push("shared upstream vowels".to_string());
    }
    if notes.is_empty() {
        notes.push(format!("no phonetic agreement between {} and {}", a, b));
    }
    format!("{}: {}", m.class, notes.join("; "))
}
