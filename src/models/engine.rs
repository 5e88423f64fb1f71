// file: src/models/engine.rs
// description: identifiers for the academic search engines under comparison
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Academic search engines, declared in canonical comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    GoogleScholar,
    SemanticScholar,
    MicrosoftAcademic,
    Scopus,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::GoogleScholar,
        EngineKind::SemanticScholar,
        EngineKind::MicrosoftAcademic,
        EngineKind::Scopus,
    ];

    /// Two-letter code used in combination labels such as `GS+SS`.
    pub fn code(&self) -> &'static str {
        match self {
            EngineKind::GoogleScholar => "GS",
            EngineKind::SemanticScholar => "SS",
            EngineKind::MicrosoftAcademic => "MA",
            EngineKind::Scopus => "SC",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::GoogleScholar => "Google Scholar",
            EngineKind::SemanticScholar => "Semantic Scholar",
            EngineKind::MicrosoftAcademic => "Microsoft Academic",
            EngineKind::Scopus => "Scopus",
        }
    }

    pub fn config_key(&self) -> &'static str {
        match self {
            EngineKind::GoogleScholar => "google_scholar",
            EngineKind::SemanticScholar => "semantic_scholar",
            EngineKind::MicrosoftAcademic => "microsoft_academic",
            EngineKind::Scopus => "scopus",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.config_key() == key || kind.code().eq_ignore_ascii_case(&key))
            .ok_or_else(|| {
                format!(
                    "unknown engine '{}', expected one of: gs, ss, ma, sc, google_scholar, semantic_scholar, microsoft_academic, scopus",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_names() {
        assert_eq!("gs".parse::<EngineKind>(), Ok(EngineKind::GoogleScholar));
        assert_eq!("SC".parse::<EngineKind>(), Ok(EngineKind::Scopus));
        assert_eq!(
            "semantic-scholar".parse::<EngineKind>(),
            Ok(EngineKind::SemanticScholar)
        );
        assert_eq!(
            "Microsoft Academic".parse::<EngineKind>(),
            Ok(EngineKind::MicrosoftAcademic)
        );
        assert!("bing".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_canonical_order() {
        let mut kinds = vec![
            EngineKind::Scopus,
            EngineKind::GoogleScholar,
            EngineKind::MicrosoftAcademic,
            EngineKind::SemanticScholar,
        ];
        kinds.sort();
        assert_eq!(kinds, EngineKind::ALL.to_vec());
    }
}
