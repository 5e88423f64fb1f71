// file: src/utils/logging.rs
// description: tracing subscriber setup and colored terminal output helpers

use crate::overlap::OverlapSummary;
use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose {
        "scholar_overlap=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_step(step: usize, total: usize, msg: &str) -> String {
    format!("{} {}", format!("[{}/{}]", step, total).cyan().bold(), msg)
}

/// Average overlap per combination as an aligned table.
pub fn format_summary_table(summary: &OverlapSummary) -> String {
    let width = summary
        .combinations
        .iter()
        .map(|c| c.combination.label().len())
        .max()
        .unwrap_or(0)
        .max("Combination".len());

    let mut out = format!(
        "{:<width$}  {:>7}  {:>8}  {:>8}\n",
        "Combination".bold(),
        "Queries".bold(),
        "Average".bold(),
        "Median".bold(),
        width = width
    );

    for row in &summary.combinations {
        let average = row
            .average
            .map(|a| format!("{:.4}", a))
            .unwrap_or_else(|| "-".to_string());
        let median = row
            .stats
            .as_ref()
            .map(|s| format!("{:.4}", s.median))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:<width$}  {:>7}  {:>8}  {:>8}\n",
            row.combination.label().cyan(),
            row.count,
            average,
            median,
            width = width
        ));
    }

    out.push_str(&format!(
        "\n{} complete, {} incomplete queries",
        summary.complete_queries.to_string().green(),
        summary.incomplete_queries.to_string().yellow()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::{OverlapAccumulator, combinations};
    use crate::models::EngineKind;

    #[test]
    fn test_summary_table_lists_every_combination() {
        colored::control::set_override(false);

        let engines = [
            EngineKind::GoogleScholar,
            EngineKind::SemanticScholar,
            EngineKind::Scopus,
        ];
        let summary = OverlapAccumulator::new(combinations(&engines)).summary();
        let table = format_summary_table(&summary);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("Combination"));
        assert!(lines[1].starts_with("GS+SS "));
        assert!(lines[4].starts_with("GS+SS+SC"));
        assert!(lines[4].trim_end().ends_with('-'));
        assert!(table.ends_with("0 complete, 0 incomplete queries"));
    }
}
