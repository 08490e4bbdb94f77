//! Phonetic rhyme classification and scoring.
//!
//! Given two ARPABET transcriptions, the engine decides whether and how
//! they rhyme — across a closed taxonomy from strict perfect rhyme down
//! to upstream assonance — and produces a continuous weighted score.
//! Verse-level analysis aggregates pairwise results into density,
//! scheme, and chain metrics.
//!
//! The pipeline is a pure function of its inputs and the immutable
//! feature tables: pronunciations, frequency statistics, and the
//! function-word stoplist are supplied by the caller through the
//! [`phrase::PronunciationProvider`], [`rhyme::FrequencyProvider`], and
//! [`phrase::Stoplist`] traits.

pub mod cache;
pub mod engine;
pub mod error;
pub mod flow;
pub mod phonetics;
pub mod phrase;
pub mod rhyme;
pub mod types;

pub use engine::{EngineConfig, RhymeEngine};
pub use error::{AmbiguityWarning, InputError, PhoneticError, RhymeError};
pub use flow::{FlowConfig, SchemeTemplate, VerseAnalysis};
pub use phrase::{Lexicon, PhraseMode, PronunciationProvider, StaticStoplist, Stoplist};
pub use rhyme::{FrequencyProvider, RarityIndex, ScoreWeights, TableFrequencyProvider};
pub use types::{Evaluation, MatchResult, RhymeClass, TailClass, Transcription, WordEvaluation};
