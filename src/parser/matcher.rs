// file: src/parser/matcher.rs
// description: maps titles from several engines onto shared canonical keys
// reference: https://docs.rs/strsim

use crate::config::MatchMode;
use crate::parser::TitleNormalizer;
use std::collections::BTreeSet;
use strsim::normalized_levenshtein;

pub struct TitleMatcher {
    normalizer: TitleNormalizer,
    threshold: f64,
}

impl TitleMatcher {
    pub fn new(mode: MatchMode, threshold: f64) -> Self {
        Self {
            normalizer: TitleNormalizer::new(mode),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn exact() -> Self {
        Self::new(MatchMode::Exact, 1.0)
    }

    pub fn mode(&self) -> MatchMode {
        self.normalizer.mode()
    }

    /// Converts each title list into a set of canonical keys.
    ///
    /// Keys are shared across lists, so set intersection on the output
    /// reflects the configured match mode. In fuzzy mode a title joins the
    /// first earlier key whose similarity reaches the threshold.
    pub fn key_sets(&self, lists: &[Vec<&str>]) -> Vec<BTreeSet<String>> {
        let mut canonical: Vec<String> = Vec::new();

        lists
            .iter()
            .map(|titles| {
                titles
                    .iter()
                    .map(|title| self.normalizer.normalize(title))
                    .filter(|key| !key.is_empty())
                    .map(|key| self.resolve(key, &mut canonical))
                    .collect()
            })
            .collect()
    }

    fn resolve(&self, key: String, canonical: &mut Vec<String>) -> String {
        if self.mode() != MatchMode::Fuzzy {
            return key;
        }

        if let Some(existing) = canonical
            .iter()
            .find(|known| **known == key || normalized_levenshtein(known, &key) >= self.threshold)
        {
            return existing.clone();
        }

        canonical.push(key.clone());
        key
    }
}

impl Default for TitleMatcher {
    fn default() -> Self {
        Self::exact()
    }
}
