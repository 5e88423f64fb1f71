// file: src/parser/patterns.rs
// description: compiled regex patterns for result page parsing
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Publication years in author/venue lines
    pub static ref YEAR: Regex = Regex::new(
        r"\b(?:19|20)\d{2}\b"
    ).expect("YEAR regex is valid");

    // "About 1,230 results (0.05 sec)"
    pub static ref RESULT_COUNT: Regex = Regex::new(
        r"(?i)(?:about\s+)?([0-9][0-9,.]*)\s+results?"
    ).expect("RESULT_COUNT regex is valid");

    // "Cited by 42"
    pub static ref CITED_BY: Regex = Regex::new(
        r"(?i)cited by\s+([0-9]+)"
    ).expect("CITED_BY regex is valid");

    // "All 7 versions"
    pub static ref ALL_VERSIONS: Regex = Regex::new(
        r"(?i)all\s+([0-9]+)\s+versions?"
    ).expect("ALL_VERSIONS regex is valid");

    // Title normalization
    pub static ref PUNCTUATION: Regex = Regex::new(
        r"[^\p{L}\p{N}\s]+"
    ).expect("PUNCTUATION regex is valid");

    pub static ref WHITESPACE: Regex = Regex::new(
        r"\s+"
    ).expect("WHITESPACE regex is valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_pattern() {
        let caps: Vec<&str> = YEAR
            .find_iter("J Smith, A Jones - Nature, 2015 - nature.com")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(caps, vec!["2015"]);
        assert!(YEAR.find("page 12345").is_none());
    }

    #[test]
    fn test_result_count_pattern() {
        let caps = RESULT_COUNT
            .captures("About 1,230 results (0.05 sec)")
            .unwrap();
        assert_eq!(&caps[1], "1,230");
    }

    #[test]
    fn test_link_patterns() {
        assert_eq!(&CITED_BY.captures("Cited by 42").unwrap()[1], "42");
        assert_eq!(&ALL_VERSIONS.captures("All 7 versions").unwrap()[1], "7");
    }
}
