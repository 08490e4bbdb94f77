//! ARPABET syllabification using the Maximum Onset Principle.
//!
//! Needed by the terminal-rime, pararhyme, and multisyllabic predicates,
//! which all reason about onset/nucleus/coda boundaries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::phonetics::features::{self, strip_stress, stress_digit};

/// One syllable decomposed into onset, nucleus, and coda.
///
/// The nucleus is a list: R-coloring can attach a postvocalic R to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllable {
    pub onset: Vec<String>,
    pub nucleus: Vec<String>,
    pub coda: Vec<String>,
}

impl Syllable {
    /// Nucleus + coda with stress digits removed.
    pub fn rime_stripped(&self) -> Vec<String> {
        self.nucleus
            .iter()
            .chain(self.coda.iter())
            .map(|p| strip_stress(p).to_string())
            .collect()
    }

    /// Onset with stress digits removed (digits never occur on onsets,
    /// but the normalization keeps comparisons uniform).
    pub fn onset_stripped(&self) -> Vec<String> {
        self.onset.iter().map(|p| strip_stress(p).to_string()).collect()
    }

    pub fn coda_stripped(&self) -> Vec<String> {
        self.coda.iter().map(|p| strip_stress(p).to_string()).collect()
    }

    /// The stress digit of the syllable's vowel, if present. Glides and
    /// R-coloring can flank the vowel inside the nucleus.
    pub fn stress(&self) -> Option<u8> {
        self.nucleus.iter().find_map(|p| stress_digit(p))
    }
}

lazy_static::lazy_static! {
    /// Lax vowel bases: the Alaska rule pulls /s/ into the coda after
    /// a stressed lax vowel.
    static ref LAX: HashSet<&'static str> = {
        ["IH", "EH", "AE", "AH", "UH"].into_iter().collect()
    };

    /// Licit 2-consonant onsets.
    static ref O2: HashSet<(&'static str, &'static str)> = {
        [
            ("P", "R"), ("T", "R"), ("K", "R"), ("B", "R"), ("D", "R"),
            ("G", "R"), ("F", "R"), ("TH", "R"),
            ("P", "L"), ("K", "L"), ("B", "L"), ("G", "L"),
            ("F", "L"), ("S", "L"),
            ("K", "W"), ("G", "W"), ("S", "W"),
            ("S", "P"), ("S", "T"), ("S", "K"),
            ("HH", "Y"),
            ("R", "W"),
        ].into_iter().collect()
    };

    /// Licit 3-consonant onsets.
    static ref O3: HashSet<(&'static str, &'static str, &'static str)> = {
        [
            ("S", "T", "R"), ("S", "K", "L"), ("T", "R", "W"),
        ].into_iter().collect()
    };
}

fn is_stressed_lax(phone: &str) -> bool {
    LAX.contains(strip_stress(phone)) && matches!(stress_digit(phone), Some(1) | Some(2))
}

/// Syllabify an ARPABET pronunciation.
///
/// The `alaska_rule` controls whether /s/ is pulled into the coda after
/// stressed lax vowels.
pub fn syllabify(pron: &[String], alaska_rule: bool) -> Result<Vec<Syllable>, InputError> {
    if pron.is_empty() {
        return Ok(vec![]);
    }

    // Find nuclei and the interludes between them
    let mut nuclei: Vec<Vec<String>> = Vec::new();
    let mut onsets: Vec<Vec<String>> = Vec::new();
    let mut last_vowel_idx: isize = -1;

    for (j, seg) in pron.iter().enumerate() {
        if features::is_vowel(seg) {
            nuclei.push(vec![seg.clone()]);
            let start = (last_vowel_idx + 1) as usize;
            onsets.push(pron[start..j].to_vec());
            last_vowel_idx = j as isize;
        }
    }

    if nuclei.is_empty() {
        return Err(InputError::NoSyllables(pron.join(" ")));
    }

    // Everything after the last vowel is the final coda
    let coda_final = pron[(last_vowel_idx + 1) as usize..].to_vec();
    let mut codas: Vec<Vec<String>> = Vec::new();

    // Split each interlude between the previous coda and the next onset
    for i in 1..onsets.len() {
        let mut coda: Vec<String> = Vec::new();

        // R-coloring: R leading a cluster joins the previous nucleus
        if onsets[i].len() > 1 && onsets[i][0] == "R" {
            let r = onsets[i].remove(0);
            nuclei[i - 1].push(r);
        }

        // Y-gliding: Y trailing a long cluster joins the next nucleus
        if onsets[i].len() > 2 && onsets[i].last().map_or(false, |s| s == "Y") {
            let y = onsets[i].pop().unwrap();
            nuclei[i].insert(0, y);
        }

        // Alaska rule: /s/ after a stressed lax vowel goes to the coda
        if onsets[i].len() > 1
            && alaska_rule
            && nuclei[i - 1].last().map_or(false, |s| is_stressed_lax(s))
            && onsets[i][0] == "S"
        {
            coda.push(onsets[i].remove(0));
        }

        // Onset maximization against the licit cluster tables
        let mut depth = 1;
        if onsets[i].len() > 1 {
            let n = onsets[i].len();
            let last_two = (onsets[i][n - 2].as_str(), onsets[i][n - 1].as_str());
            if O2.contains(&last_two) {
                depth = 2;
                if n >= 3 {
                    let last_three = (
                        onsets[i][n - 3].as_str(),
                        onsets[i][n - 2].as_str(),
                        onsets[i][n - 1].as_str(),
                    );
                    if O3.contains(&last_three) {
                        depth = 3;
                    }
                }
            }
        }

        let drain = onsets[i].len().saturating_sub(depth);
        for _ in 0..drain {
            coda.push(onsets[i].remove(0));
        }

        codas.push(coda);
    }

    codas.push(coda_final);

    let syllables: Vec<Syllable> = onsets
        .into_iter()
        .zip(nuclei)
        .zip(codas)
        .map(|((onset, nucleus), coda)| Syllable { onset, nucleus, coda })
        .collect();

    // Every input segment must be accounted for exactly once
    let flat: Vec<&str> = syllables
        .iter()
        .flat_map(|s| {
            s.onset
                .iter()
                .chain(s.nucleus.iter())
                .chain(s.coda.iter())
                .map(|p| p.as_str())
        })
        .collect();
    let original: Vec<&str> = pron.iter().map(|p| p.as_str()).collect();
    debug_assert_eq!(flat, original, "syllabification dropped segments");

    Ok(syllables)
}
