// file: src/utils/validation.rs
// description: input validation helpers shared by config loading and the cli
// reference: input validation patterns

use crate::error::{OverlapError, Result};
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_url(name: &str, url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(OverlapError::Validation(format!(
                "{} must be an http(s) URL, is \"{}\"",
                name, url
            )));
        }
        Ok(())
    }

    pub fn validate_readable_file(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(OverlapError::Validation(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(OverlapError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
        if value.is_nan() || value < min || value > max {
            return Err(OverlapError::Validation(format!(
                "{} must be between {} and {}, is {}",
                name, min, max, value
            )));
        }
        Ok(())
    }

    pub fn validate_year(value: &str) -> Result<i32> {
        let year: i32 = value.trim().parse().map_err(|_| {
            OverlapError::QueryArgument(format!("\"{}\" is not a year", value.trim()))
        })?;

        if !(1000..=9999).contains(&year) {
            return Err(OverlapError::QueryArgument(format!(
                "year {} is out of range",
                year
            )));
        }
        Ok(year)
    }

    /// Shortens text to `max_chars` characters for terminal display.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            format!("{}...", text.chars().take(max_chars).collect::<String>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("base_url", "https://example.com").is_ok());
        assert!(Validator::validate_url("base_url", "http://localhost:8080").is_ok());
        assert!(Validator::validate_url("base_url", "example.com").is_err());
        assert!(Validator::validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_readable_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("ccs.xml");
        fs::write(&file_path, "<rdf:RDF/>").unwrap();

        assert!(Validator::validate_readable_file(&file_path).is_ok());
        assert!(Validator::validate_readable_file(temp.path()).is_err());
        assert!(Validator::validate_readable_file(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(Validator::validate_range("threshold", 0.9, 0.0, 1.0).is_ok());
        assert!(Validator::validate_range("threshold", 1.5, 0.0, 1.0).is_err());
        assert!(Validator::validate_range("threshold", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_year() {
        assert_eq!(Validator::validate_year(" 2012 ").unwrap(), 2012);
        assert!(Validator::validate_year("twenty").is_err());
        assert!(Validator::validate_year("99").is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("Übersicht über Ontologien", 9),
            "Übersicht..."
        );
    }
}
