// file: src/overlap/combinations.rs
// description: engine combinations scored for overlap and their labels
// reference: internal data structures

use crate::models::EngineKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered set of at least two engines, labelled like `GS+SS+SC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Combination {
    engines: Vec<EngineKind>,
}

impl Combination {
    pub fn new(mut engines: Vec<EngineKind>) -> Result<Self, String> {
        engines.sort();
        engines.dedup();
        if engines.len() < 2 {
            return Err(format!(
                "a combination needs at least two distinct engines, got {}",
                engines.len()
            ));
        }
        Ok(Self { engines })
    }

    pub fn engines(&self) -> &[EngineKind] {
        &self.engines
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn contains(&self, kind: EngineKind) -> bool {
        self.engines.contains(&kind)
    }

    pub fn label(&self) -> String {
        self.engines
            .iter()
            .map(|e| e.code())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Combination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let engines = s
            .split('+')
            .map(|code| code.parse::<EngineKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(engines)
    }
}

impl TryFrom<String> for Combination {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Combination> for String {
    fn from(combination: Combination) -> Self {
        combination.label()
    }
}

/// Every subset of two or more engines: pairs first, then triples, and so on.
/// Within a size, subsets follow the canonical engine order.
pub fn combinations(engines: &[EngineKind]) -> Vec<Combination> {
    let mut pool = engines.to_vec();
    pool.sort();
    pool.dedup();

    let mut all = Vec::new();
    for size in 2..=pool.len() {
        let mut current = Vec::with_capacity(size);
        collect_subsets(&pool, size, 0, &mut current, &mut all);
    }
    all
}

fn collect_subsets(
    pool: &[EngineKind],
    size: usize,
    start: usize,
    current: &mut Vec<EngineKind>,
    out: &mut Vec<Combination>,
) {
    if current.len() == size {
        out.push(Combination {
            engines: current.clone(),
        });
        return;
    }

    for index in start..pool.len() {
        current.push(pool[index]);
        collect_subsets(pool, size, index + 1, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_four_engines_give_eleven_combinations() {
        let labels: Vec<String> = combinations(&EngineKind::ALL)
            .iter()
            .map(Combination::label)
            .collect();

        assert_eq!(
            labels,
            vec![
                "GS+SS", "GS+MA", "GS+SC", "SS+MA", "SS+SC", "MA+SC", "GS+SS+MA", "GS+SS+SC",
                "GS+MA+SC", "SS+MA+SC", "GS+SS+MA+SC",
            ]
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = combinations(&[EngineKind::Scopus, EngineKind::GoogleScholar]);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].label(), "GS+SC");
    }

    #[test]
    fn test_single_engine_has_no_combinations() {
        assert!(combinations(&[EngineKind::GoogleScholar]).is_empty());
        assert!(Combination::new(vec![EngineKind::Scopus, EngineKind::Scopus]).is_err());
    }

    #[test]
    fn test_label_parses_back() {
        let combination: Combination = "GS+SS+SC".parse().unwrap();
        assert_eq!(combination.len(), 3);
        assert!(combination.contains(EngineKind::Scopus));
        assert!(!combination.contains(EngineKind::MicrosoftAcademic));

        let json = serde_json::to_string(&combination).unwrap();
        assert_eq!(json, "\"GS+SS+SC\"");
    }
}
