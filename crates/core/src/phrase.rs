//! Phrase and compound resolution.
//!
//! Multi-word input is evaluated as its final content word (trailing
//! function words stripped via the stoplist), with the earlier content
//! words kept as upstream context so pre-stress assonance still sees
//! them. Whole-span mode keeps every word instead. Pronunciations come
//! from a pluggable provider; a CMU-dictionary-format [`Lexicon`] is the
//! stock implementation.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;

use crate::error::{InputError, RhymeError};
use crate::types::Transcription;

/// Maps a word to its pronunciation variants. Implementations return an
/// empty list for out-of-vocabulary words.
pub trait PronunciationProvider: Send + Sync {
    fn pronounce(&self, word: &str) -> Vec<Transcription>;
}

/// Function-word test used to find the rhyme-bearing content word.
pub trait Stoplist: Send + Sync {
    fn is_function_word(&self, word: &str) -> bool;
}

lazy_static::lazy_static! {
    static ref FUNCTION_WORDS: HashSet<&'static str> = {
        [
            "a", "an", "the", "of", "to", "in", "on", "at", "by", "for",
            "with", "from", "and", "or", "but", "nor", "so", "yet", "as",
            "is", "am", "are", "was", "were", "be", "been", "being",
            "it", "its", "that", "this", "these", "those",
            "i", "you", "he", "she", "we", "they", "them", "him", "us", "me",
            "his", "her", "their", "my", "your", "our",
            "not", "no", "do", "does", "did", "have", "has", "had",
            "will", "would", "can", "could", "shall", "should", "may",
            "might", "must", "if", "then", "than", "too", "there", "here",
            "when", "where", "while", "because", "about", "into", "over",
            "under", "up", "down", "out", "off",
        ].into_iter().collect()
    };
}

/// Built-in English function-word stoplist.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticStoplist;

impl Stoplist for StaticStoplist {
    fn is_function_word(&self, word: &str) -> bool {
        FUNCTION_WORDS.contains(word.to_lowercase().as_str())
    }
}

/// How a multi-word input resolves to the transcription under
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhraseMode {
    /// Evaluate the final content word; earlier content words remain as
    /// upstream context only.
    #[default]
    FinalContentWord,
    /// Extract the tail across the whole span, function words included.
    WholeSpan,
}

/// A resolved phrase: the target word and the transcription variants to
/// run through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseResolution {
    /// The rhyme-bearing word the resolution settled on.
    pub target: String,
    /// One transcription per pronunciation variant of the target,
    /// prefixed with the upstream context phones.
    pub variants: Vec<Transcription>,
    pub is_phrase: bool,
    /// Hyphenated targets get the terminal-rime flag evaluated
    /// alongside the strict tail, as every pair does.
    pub is_compound: bool,
}

fn clean_word(raw: &str) -> String {
    raw.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '\''))
        .to_lowercase()
}

/// Split an input line into cleaned words. Hyphens stay inside words so
/// compounds survive.
pub fn split_words(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Index of the final content word: trailing function words are
/// stripped, but an all-function phrase keeps its last word.
pub fn final_content_index(words: &[String], stoplist: &dyn Stoplist) -> Option<usize> {
    if words.is_empty() {
        return None;
    }
    words
        .iter()
        .rposition(|w| !stoplist.is_function_word(w))
        .or(Some(words.len() - 1))
}

/// Resolve an input word or phrase to its evaluation transcriptions.
pub fn resolve(
    input: &str,
    mode: PhraseMode,
    provider: &dyn PronunciationProvider,
    stoplist: &dyn Stoplist,
) -> Result<PhraseResolution, RhymeError> {
    let words = split_words(input);
    if words.is_empty() {
        return Ok(PhraseResolution {
            target: String::new(),
            variants: vec![Transcription::empty()],
            is_phrase: false,
            is_compound: false,
        });
    }

    let target_idx = match mode {
        PhraseMode::FinalContentWord => final_content_index(&words, stoplist).unwrap(),
        PhraseMode::WholeSpan => words.len() - 1,
    };
    let target = words[target_idx].clone();

    let target_variants = provider.pronounce(&target);
    if target_variants.is_empty() {
        return Err(InputError::MissingPronunciation(target).into());
    }

    // Upstream context: first-variant pronunciations of the words
    // before the target. Default mode keeps content words only so
    // pre-stress assonance never counts function words.
    let mut prefix = Transcription::empty();
    for word in &words[..target_idx] {
        if mode == PhraseMode::FinalContentWord && stoplist.is_function_word(word) {
            continue;
        }
        match provider.pronounce(word).into_iter().next() {
            Some(t) => prefix = prefix.join(&t),
            None => log::debug!("skipping unpronounceable phrase word '{}'", word),
        }
    }

    let variants = target_variants
        .into_iter()
        .map(|t| prefix.join(&t))
        .collect();

    Ok(PhraseResolution {
        target: target.clone(),
        variants,
        is_phrase: words.len() > 1,
        is_compound: target.contains('-'),
    })
}

/// Pronunciation lexicon in CMU dictionary format.
///
/// One entry per line: `WORD  PH1 PH2 ...`; lines starting with `;;;`
/// are comments; variants are marked `WORD(2)`.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<Transcription>>,
}

impl Lexicon {
    /// Parse CMU-format dictionary text. Lines with unknown phones are
    /// skipped with a warning rather than poisoning the whole table.
    pub fn from_text(data: &str) -> Self {
        let mut entries: HashMap<String, Vec<Transcription>> = HashMap::new();
        let mut skipped = 0usize;
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }
            let mut parts = line.splitn(2, char::is_whitespace);
            let (Some(word_raw), Some(phones_str)) = (parts.next(), parts.next()) else {
                continue;
            };
            // Strip variant marker: WORD(2) -> WORD
            let word = word_raw
                .split('(')
                .next()
                .unwrap_or(word_raw)
                .to_lowercase();
            match Transcription::parse(phones_str) {
                Ok(t) if !t.is_empty() => entries.entry(word).or_default().push(t),
                Ok(_) => {}
                Err(e) => {
                    skipped += 1;
                    log::warn!("skipping lexicon line for '{}': {}", word, e);
                }
            }
        }
        log::info!(
            "loaded lexicon: {} words ({} lines skipped)",
            entries.len(),
            skipped
        );
        Lexicon { entries }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lexicon: {}", path.display()))?;
        Ok(Self::from_text(&data))
    }

    pub fn insert(&mut self, word: &str, t: Transcription) {
        self.entries.entry(word.to_lowercase()).or_default().push(t);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PronunciationProvider for Lexicon {
    fn pronounce(&self, word: &str) -> Vec<Transcription> {
        let key = word.to_lowercase();
        if let Some(variants) = self.entries.get(&key) {
            return variants.clone();
        }
        // Hyphenated compound fallback: concatenate the parts
        if key.contains('-') {
            let mut phones: Vec<String> = Vec::new();
            for part in key.split('-').filter(|p| !p.is_empty()) {
                match self.entries.get(part).and_then(|v| v.first()) {
                    Some(t) => phones.extend(t.phones().iter().cloned()),
                    None => return vec![],
                }
            }
            if !phones.is_empty() {
                // Parts came from validated entries
                if let Ok(joined) = Transcription::from_phones(phones) {
                    return vec![joined];
                }
            }
        }
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::from_text(
            ";;; test fixture\n\
             WITHOUT  W IH0 DH AW1 T\n\
             STAKE  S T EY1 K\n\
             OUT  AW1 T\n\
             CHECK  CH EH1 K\n\
             GUITAR  G IH0 T AA1 R\n\
             SOLO  S OW1 L OW0\n\
             TOMATO  T AH0 M EY1 T OW0\n\
             TOMATO(2)  T AH0 M AA1 T OW0\n",
        )
    }

    #[test]
    fn test_lexicon_parse() {
        let lex = lexicon();
        assert_eq!(lex.len(), 7);
        assert_eq!(lex.pronounce("without").len(), 1);
        assert_eq!(lex.pronounce("WITHOUT").len(), 1);
        assert_eq!(lex.pronounce("tomato").len(), 2);
        assert!(lex.pronounce("zzz").is_empty());
    }

    #[test]
    fn test_lexicon_skips_bad_lines() {
        let lex = Lexicon::from_text("GOOD  K AE1 T\nBAD  QX YY\n");
        assert_eq!(lex.len(), 1);
        assert!(lex.pronounce("bad").is_empty());
    }

    #[test]
    fn test_compound_fallback() {
        let lex = lexicon();
        let prons = lex.pronounce("stake-out");
        assert_eq!(prons.len(), 1);
        assert_eq!(prons[0].to_string(), "S T EY1 K AW1 T");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("Check it out!"), vec!["check", "it", "out"]);
        assert_eq!(split_words("stake-out"), vec!["stake-out"]);
        assert!(split_words("  ").is_empty());
    }

    #[test]
    fn test_final_content_word_strips_trailing_function_words() {
        let words = split_words("check it out");
        let idx = final_content_index(&words, &StaticStoplist).unwrap();
        assert_eq!(words[idx], "check");
    }

    #[test]
    fn test_all_function_words_keeps_last() {
        let words = split_words("of the");
        let idx = final_content_index(&words, &StaticStoplist).unwrap();
        assert_eq!(words[idx], "the");
    }

    #[test]
    fn test_resolve_single_word() {
        let lex = lexicon();
        let r = resolve("guitar", PhraseMode::FinalContentWord, &lex, &StaticStoplist).unwrap();
        assert_eq!(r.target, "guitar");
        assert!(!r.is_phrase);
        assert_eq!(r.variants.len(), 1);
        assert_eq!(r.variants[0].to_string(), "G IH0 T AA1 R");
    }

    #[test]
    fn test_resolve_phrase_keeps_upstream_content() {
        let lex = lexicon();
        let r = resolve(
            "guitar solo",
            PhraseMode::FinalContentWord,
            &lex,
            &StaticStoplist,
        )
        .unwrap();
        assert_eq!(r.target, "solo");
        assert!(r.is_phrase);
        assert_eq!(r.variants[0].to_string(), "G IH0 T AA1 R S OW1 L OW0");
    }

    #[test]
    fn test_resolve_whole_span() {
        let lex = lexicon();
        let r = resolve("check it out", PhraseMode::WholeSpan, &lex, &StaticStoplist).unwrap();
        assert_eq!(r.target, "out");
        // Function word "it" has no lexicon entry in the fixture and is
        // skipped, but the span keeps every pronounceable word
        assert_eq!(r.variants[0].to_string(), "CH EH1 K AW1 T");
    }

    #[test]
    fn test_resolve_variant_fanout() {
        let lex = lexicon();
        let r = resolve("tomato", PhraseMode::FinalContentWord, &lex, &StaticStoplist).unwrap();
        assert_eq!(r.variants.len(), 2);
    }

    #[test]
    fn test_resolve_missing_word() {
        let lex = lexicon();
        let err = resolve("xylophone", PhraseMode::FinalContentWord, &lex, &StaticStoplist);
        assert!(matches!(
            err,
            Err(RhymeError::Input(InputError::MissingPronunciation(_)))
        ));
    }

    #[test]
    fn test_resolve_empty_input() {
        let lex = lexicon();
        let r = resolve("", PhraseMode::FinalContentWord, &lex, &StaticStoplist).unwrap();
        assert!(r.variants[0].is_empty());
    }

    #[test]
    fn test_static_stoplist() {
        let s = StaticStoplist;
        assert!(s.is_function_word("the"));
        assert!(s.is_function_word("The"));
        assert!(!s.is_function_word("guitar"));
    }
}
