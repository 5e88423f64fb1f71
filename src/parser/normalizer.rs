// file: src/parser/normalizer.rs
// description: title normalization so engines' renderings of a paper compare equal
// reference: internal matching rules

use crate::config::MatchMode;
use crate::parser::patterns::{PUNCTUATION, WHITESPACE};

pub struct TitleNormalizer {
    mode: MatchMode,
}

impl TitleNormalizer {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Exact mode only trims; the other modes fold case and punctuation.
    pub fn normalize(&self, title: &str) -> String {
        match self.mode {
            MatchMode::Exact => title.trim().to_string(),
            MatchMode::Normalized | MatchMode::Fuzzy => Self::fold(title),
        }
    }

    pub fn fold(title: &str) -> String {
        let lowered = title.to_lowercase();
        let stripped = PUNCTUATION.replace_all(&lowered, " ");
        WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::new(MatchMode::Exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_only_trims() {
        let normalizer = TitleNormalizer::default();
        assert_eq!(
            normalizer.normalize("  Deep Learning: A Review "),
            "Deep Learning: A Review"
        );
    }

    #[test]
    fn test_normalized_folds_case_and_punctuation() {
        let normalizer = TitleNormalizer::new(MatchMode::Normalized);
        assert_eq!(
            normalizer.normalize("Deep  Learning:\nA Review."),
            "deep learning a review"
        );
        assert_eq!(
            normalizer.normalize("Réseaux de neurones — état de l'art"),
            "réseaux de neurones état de l art"
        );
    }
}
