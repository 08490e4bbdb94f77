//! Bounded memoization of pairwise evaluations.
//!
//! Evaluation is a pure function of its inputs, so cached values never
//! go stale and eviction timing cannot affect correctness. Keys are
//! canonically ordered so the symmetric pair hits the same slot.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::types::{Evaluation, Transcription};

type PairKey = (Transcription, Transcription);

/// Thread-safe LRU cache over transcription pairs.
pub struct EvalCache {
    inner: Mutex<LruCache<PairKey, Evaluation>>,
}

impl EvalCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        EvalCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn key(a: &Transcription, b: &Transcription) -> PairKey {
        if a.phones() <= b.phones() {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    pub fn get(&self, a: &Transcription, b: &Transcription) -> Option<Evaluation> {
        let key = Self::key(a, b);
        let mut inner = self.inner.lock().expect("eval cache poisoned");
        let hit = inner.get(&key).cloned();
        if hit.is_some() {
            log::debug!("cache hit: {} / {}", a, b);
        }
        hit
    }

    pub fn put(&self, a: &Transcription, b: &Transcription, eval: Evaluation) {
        let key = Self::key(a, b);
        let mut inner = self.inner.lock().expect("eval cache poisoned");
        inner.put(key, eval);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("eval cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchResult, RhymeClass};

    fn t(s: &str) -> Transcription {
        Transcription::parse(s).unwrap()
    }

    fn eval(class: RhymeClass) -> Evaluation {
        let mut matches = MatchResult::none();
        matches.class = class;
        Evaluation {
            matches,
            wrs: 0.5,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_symmetric_key() {
        let cache = EvalCache::new(NonZeroUsize::new(4).unwrap());
        let a = t("K AE1 T");
        let b = t("B AE1 T");
        cache.put(&a, &b, eval(RhymeClass::Perfect));
        assert!(cache.get(&b, &a).is_some());
    }

    #[test]
    fn test_eviction_bounds_size() {
        let cache = EvalCache::new(NonZeroUsize::new(2).unwrap());
        let words = ["K AE1 T", "B AE1 T", "S AE1 T", "M AE1 T"];
        for w in words {
            cache.put(&t(w), &t("HH AE1 T"), eval(RhymeClass::Perfect));
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_miss() {
        let cache = EvalCache::new(NonZeroUsize::new(2).unwrap());
        assert!(cache.get(&t("K AE1 T"), &t("B AE1 T")).is_none());
        assert!(cache.is_empty());
    }
}
