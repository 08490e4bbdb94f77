//! Error taxonomy for rhyme evaluation.
//!
//! Phonetic and input failures are fatal to the single evaluation they
//! occur in and surface immediately. Ambiguity across pronunciation
//! variants is not an error: it rides along with the best result as an
//! [`AmbiguityWarning`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RhymeClass;

/// A phone symbol outside the fixed ARPABET alphabet.
///
/// Never silently substituted: an unknown phone would corrupt every
/// downstream tail comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneticError {
    #[error("unrecognized phone symbol '{0}'")]
    UnknownSymbol(String),
}

/// Empty or malformed caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Stress digit out of range, or a stress digit on a consonant.
    #[error("malformed phone '{0}': {1}")]
    Malformed(String, String),
    /// The pronunciation provider had nothing for this word.
    #[error("no pronunciation available for '{0}'")]
    MissingPronunciation(String),
    /// A transcription with no vowel cannot be syllabified.
    #[error("no syllable nucleus in '{0}'")]
    NoSyllables(String),
}

/// Umbrella error for the evaluation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RhymeError {
    #[error(transparent)]
    Phonetic(#[from] PhoneticError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Non-fatal notice that pronunciation variants disagreed on
/// classification. The best (highest-WRS) pair is still returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguityWarning {
    /// Distinct classes observed across the variant pairs.
    pub classes: Vec<RhymeClass>,
}
