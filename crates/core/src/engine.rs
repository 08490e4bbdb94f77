//! Engine facade: providers, rarity, cache, and configuration wired
//! into the pairwise, word-level, batch, and verse entry points.

use std::num::NonZeroUsize;

use crate::cache::EvalCache;
use crate::error::{AmbiguityWarning, RhymeError};
use crate::flow::{self, FlowConfig, VerseAnalysis};
use crate::phonetics::tail;
use crate::phrase::{self, PhraseMode, PronunciationProvider, Stoplist};
use crate::rhyme::evaluate::{self, evaluate_transcriptions, evaluate_with_spellings};
use crate::rhyme::scoring::{self, ScoreWeights};
use crate::rhyme::RarityIndex;
use crate::types::{Evaluation, RhymeClass, Transcription, WordEvaluation};

/// Engine-wide settings. All fields have sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub phrase_mode: PhraseMode,
    pub flow: FlowConfig,
    pub weights: ScoreWeights,
    /// Pairwise memoization capacity; `None` disables the cache.
    pub cache_size: Option<NonZeroUsize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            phrase_mode: PhraseMode::default(),
            flow: FlowConfig::default(),
            weights: ScoreWeights::default(),
            cache_size: NonZeroUsize::new(4096),
        }
    }
}

/// The rhyme engine: a pure pipeline over immutable tables plus the
/// three external collaborators.
pub struct RhymeEngine {
    provider: Box<dyn PronunciationProvider>,
    stoplist: Box<dyn Stoplist>,
    rarity: RarityIndex,
    config: EngineConfig,
    cache: Option<EvalCache>,
}

impl RhymeEngine {
    pub fn new(
        provider: Box<dyn PronunciationProvider>,
        stoplist: Box<dyn Stoplist>,
        rarity: RarityIndex,
    ) -> Self {
        Self::with_config(provider, stoplist, rarity, EngineConfig::default())
    }

    pub fn with_config(
        provider: Box<dyn PronunciationProvider>,
        stoplist: Box<dyn Stoplist>,
        rarity: RarityIndex,
        config: EngineConfig,
    ) -> Self {
        let cache = config.cache_size.map(EvalCache::new);
        RhymeEngine {
            provider,
            stoplist,
            rarity,
            config,
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pairwise rarity: the mean of both tails' rarity, which keeps the
    /// score symmetric when the two tail classes differ.
    fn pair_rarity(&self, a: &Transcription, b: &Transcription) -> f64 {
        let kr = |t: &Transcription| tail::tail_class(t).map(|c| self.rarity.kr(&c));
        match (kr(a), kr(b)) {
            (Some(x), Some(y)) => (x + y) / 2.0,
            (Some(x), None) | (None, Some(x)) => x,
            (None, None) => 0.0,
        }
    }

    fn build_evaluation(
        &self,
        a: &Transcription,
        b: &Transcription,
        spellings: Option<(&str, &str)>,
    ) -> Evaluation {
        let matches = match spellings {
            Some((sa, sb)) => evaluate_with_spellings(a, b, sa, sb),
            None => evaluate_transcriptions(a, b),
        };
        let wrs = scoring::weighted_score(&matches, self.pair_rarity(a, b), &self.config.weights);
        let explanation = evaluate::explain(&matches, a, b);
        Evaluation {
            matches,
            wrs,
            explanation,
        }
    }

    /// Evaluate one transcription pair. Pure and memoized; symmetric in
    /// its arguments.
    pub fn evaluate(&self, a: &Transcription, b: &Transcription) -> Evaluation {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(a, b) {
                return hit;
            }
        }
        let eval = self.build_evaluation(a, b, None);
        if let Some(cache) = &self.cache {
            cache.put(a, b, eval.clone());
        }
        eval
    }

    /// Evaluate two words or phrases, trying every pronunciation-variant
    /// pair and reporting the strongest. Variant disagreement on class
    /// attaches an [`AmbiguityWarning`] and a bounded downweight.
    pub fn evaluate_words(&self, a: &str, b: &str) -> Result<WordEvaluation, RhymeError> {
        let ra = phrase::resolve(a, self.config.phrase_mode, &*self.provider, &*self.stoplist)?;
        let rb = phrase::resolve(b, self.config.phrase_mode, &*self.provider, &*self.stoplist)?;

        let spelling_a = if ra.target.is_empty() { a } else { ra.target.as_str() };
        let spelling_b = if rb.target.is_empty() { b } else { rb.target.as_str() };

        let mut best: Option<(Evaluation, &Transcription, &Transcription)> = None;
        let mut classes: Vec<RhymeClass> = Vec::new();

        for va in &ra.variants {
            for vb in &rb.variants {
                let eval = self.build_evaluation(va, vb, Some((spelling_a, spelling_b)));
                if !classes.contains(&eval.matches.class) {
                    classes.push(eval.matches.class);
                }
                let better = match &best {
                    None => true,
                    Some((cur, _, _)) => {
                        eval.wrs > cur.wrs
                            || (eval.wrs == cur.wrs
                                && eval.matches.class.rank() > cur.matches.class.rank())
                    }
                };
                if better {
                    best = Some((eval, va, vb));
                }
            }
        }

        let (mut evaluation, va, vb) = best.expect("resolution always yields variants");
        let warning = if classes.len() > 1 {
            log::debug!(
                "variant disagreement for '{}' / '{}': {:?}",
                a,
                b,
                classes
            );
            evaluation.wrs =
                scoring::downweight_for_ambiguity(evaluation.wrs, &evaluation.matches);
            Some(AmbiguityWarning { classes })
        } else {
            None
        };

        Ok(WordEvaluation {
            evaluation,
            pron_a: va.clone(),
            pron_b: vb.clone(),
            warning,
        })
    }

    /// Evaluate one query against many candidates. A failing candidate
    /// is reported in place and never aborts the batch.
    pub fn evaluate_batch(
        &self,
        query: &str,
        candidates: &[String],
    ) -> Vec<(String, Result<WordEvaluation, RhymeError>)> {
        candidates
            .iter()
            .map(|c| (c.clone(), self.evaluate_words(query, c)))
            .collect()
    }

    /// Analyze a verse line by line. Lines that fail to resolve are
    /// isolated: they join the analysis as empty transcriptions and
    /// simply never rhyme.
    pub fn analyze_verse(&self, lines: &[String]) -> VerseAnalysis {
        let transcriptions: Vec<Transcription> = lines
            .iter()
            .map(|line| {
                match phrase::resolve(
                    line,
                    self.config.phrase_mode,
                    &*self.provider,
                    &*self.stoplist,
                ) {
                    Ok(r) => r
                        .variants
                        .into_iter()
                        .next()
                        .unwrap_or_else(Transcription::empty),
                    Err(e) => {
                        log::warn!("line '{}' skipped: {}", line, e);
                        Transcription::empty()
                    }
                }
            })
            .collect();
        flow::analyze(&transcriptions, &self.config.flow)
    }
}
