// file: src/exporter/mod.rs
// description: run output writers

pub mod csv;
pub mod json;

pub use self::csv::CsvExporter;
pub use json::{JsonExporter, RunReport, RunSettings};
