// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use scholar_overlap::engines::{
    CitationFormat, GoogleScholar, HttpClient, ScholarSettings, search_timed,
};
use scholar_overlap::overlap::combinations;
use scholar_overlap::pipeline::reanalyze;
use scholar_overlap::utils::logging::{
    format_error, format_info, format_step, format_success, format_summary_table,
    format_warning,
};
use scholar_overlap::{
    Article, Config, CsvExporter, EngineKind, EngineResults, ExperimentRunner, HealthReport,
    JsonExporter, MatchMode, OperationTimer, QueryDataset, QueryLevel, RunReport, RunSettings,
    SearchQuery, TitleMatcher, build_engine, build_engines,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "scholar_overlap")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "Measure result overlap across academic search engines", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the overlap experiment over the query dataset
    Run {
        #[arg(long, value_name = "LEVEL")]
        level: Option<QueryLevel>,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,

        /// Plain-text query file, one query per line
        #[arg(long, value_name = "FILE")]
        query_file: Option<PathBuf>,

        #[arg(long, value_name = "MODE")]
        match_mode: Option<MatchMode>,
    },

    /// Send one query and print each engine's results
    Query {
        /// Words that must all appear
        text: Option<String>,

        #[arg(short, long = "engine", value_name = "ENGINE")]
        engines: Vec<EngineKind>,

        #[arg(short = 'n', long, value_name = "NUM")]
        count: Option<usize>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        phrase: Option<String>,

        /// Results must contain at least one of these words (comma separates phrases)
        #[arg(long, value_name = "WORDS")]
        some: Option<String>,

        /// Results must contain none of these words (comma separates phrases)
        #[arg(long, value_name = "WORDS")]
        none: Option<String>,

        #[arg(short, long)]
        title_only: bool,

        #[arg(long = "pub", value_name = "PUBLICATION")]
        publication: Option<String>,

        #[arg(long, value_name = "YEAR")]
        after: Option<String>,

        #[arg(long, value_name = "YEAR")]
        before: Option<String>,

        #[arg(long)]
        no_patents: bool,

        #[arg(long)]
        no_citations: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
        format: OutputFormat,

        /// Google Scholar citation export: bt, en, rm or rw
        #[arg(long, value_name = "FORMAT")]
        citation: Option<CitationFormat>,
    },

    /// Print the queries generated from the taxonomy
    Dataset {
        #[arg(long, value_name = "LEVEL")]
        level: Option<QueryLevel>,

        /// Only print the number of queries
        #[arg(long)]
        count: bool,
    },

    /// Recompute overlap from a saved run report
    Analyze {
        report: PathBuf,

        #[arg(long, value_name = "MODE")]
        match_mode: Option<MatchMode>,

        #[arg(long, value_name = "NUM")]
        max_results: Option<usize>,
    },

    /// Validate configuration, taxonomy and engine setup
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Txt,
    Csv,
    CsvHeader,
    Citation,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    scholar_overlap::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Loading configuration from: {}", cli.config.display());
    let mut config = load_config(&cli.config)?;

    match cli.command {
        Commands::Run {
            level,
            limit,
            query_file,
            match_mode,
        } => {
            if let Some(level) = level {
                config.experiment.level = level;
            }
            if let Some(mode) = match_mode {
                config.experiment.match_mode = mode;
            }
            if limit.is_some() {
                config.experiment.query_limit = limit;
            }
            if query_file.is_some() {
                config.dataset.query_file = query_file;
            }
            config.validate().context("Invalid configuration")?;
            cmd_run(&config, cli.color).await?;
        }
        Commands::Query {
            text,
            engines,
            count,
            author,
            phrase,
            some,
            none,
            title_only,
            publication,
            after,
            before,
            no_patents,
            no_citations,
            format,
            citation,
        } => {
            let mut query = SearchQuery {
                words: text,
                words_some: some,
                words_none: none,
                phrase,
                title_only,
                author,
                publication,
                include_patents: !no_patents,
                include_citations: !no_citations,
                ..SearchQuery::default()
            };
            if let Some(count) = count {
                query = query.with_num_results(count);
            }
            query.set_timeframe(after.as_deref(), before.as_deref())?;
            query.validate()?;

            let citation = match (format, citation) {
                (OutputFormat::Citation, None) => CitationFormat::BibTex,
                (_, Some(citation)) => citation,
                _ => CitationFormat::None,
            };
            cmd_query(&config, &query, &engines, format, citation).await?;
        }
        Commands::Dataset { level, count } => {
            cmd_dataset(&config, level.unwrap_or(config.experiment.level), count)?;
        }
        Commands::Analyze {
            report,
            match_mode,
            max_results,
        } => {
            cmd_analyze(&config, &report, match_mode, max_results)?;
        }
        Commands::Check => {
            cmd_check(&config)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(Some(path)).context("Failed to load configuration");
    }

    warn!(
        "Config file {} not found, using default configuration",
        path.display()
    );
    Ok(Config::load(None).unwrap_or_else(|e| {
        warn!("Falling back to built-in defaults: {}", e);
        Config::default_config()
    }))
}

async fn cmd_run(config: &Config, colored: bool) -> Result<()> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("Starting run {}", run_id);

    println!("{}", format_step(1, 3, "Loading query dataset"));
    let dataset = QueryDataset::load(&config.dataset, config.experiment.level)
        .context("Failed to load query dataset")?
        .limit(config.experiment.query_limit);
    println!(
        "{}",
        format_info(&format!("{} queries from {}", dataset.len(), dataset.source))
    );

    println!("{}", format_step(2, 3, "Querying search engines"));
    let engines = build_engines(config).context("Failed to set up search engines")?;
    let runner = ExperimentRunner::new(engines, &config.experiment).with_progress(colored);
    let timer = OperationTimer::new("overlap experiment");
    let outcome = runner.run(&dataset.queries).await?;
    timer.finish_with_count(outcome.records.len());

    println!("{}", format_step(3, 3, "Writing results"));
    let combos = combinations(&runner.engine_kinds());
    let report = RunReport::new(
        run_id,
        started_at,
        RunSettings::from_config(config, &dataset.source),
        outcome,
    );

    let json = JsonExporter::new(&config.output.directory, config.output.pretty)?;
    let csv = CsvExporter::new(&config.output.directory)?;
    let report_path = json.write(&report)?;
    let overlap_path = csv.write_overlap(&run_id, &combos, &report.records)?;
    let summary_path = csv.write_summary(&run_id, &report.summary)?;

    println!("\n{}\n", format_summary_table(&report.summary));
    for path in [report_path, overlap_path, summary_path] {
        println!("{}", format_success(&format!("Wrote {}", path.display())));
    }

    if report.summary.complete_queries == 0 {
        println!(
            "{}",
            format_warning("No query was answered by every engine; averages are undefined")
        );
    }

    Ok(())
}

async fn cmd_query(
    config: &Config,
    query: &SearchQuery,
    engines: &[EngineKind],
    format: OutputFormat,
    citation: CitationFormat,
) -> Result<()> {
    let mut kinds = if engines.is_empty() {
        config.engines.enabled()
    } else {
        engines.to_vec()
    };
    kinds.sort();
    kinds.dedup();

    let mut csv_header_printed = false;

    for kind in kinds {
        let results = if kind == EngineKind::GoogleScholar && citation != CitationFormat::None {
            scholar_with_citations(config, query, citation).await?
        } else {
            let engine = build_engine(config, kind)
                .with_context(|| format!("Failed to set up {}", kind))?;
            search_timed(engine.as_ref(), query).await
        };

        println!(
            "\n{}",
            format_info(&format!(
                "{}: {} results{}",
                kind,
                results.articles.len(),
                results
                    .total_results
                    .map(|t| format!(" of about {}", t))
                    .unwrap_or_default()
            ))
        );
        if !results.is_usable() {
            println!("{}", format_error(&format!("{:?}", results.status)));
            continue;
        }

        print_articles(&results.articles, format, &mut csv_header_printed);
    }

    Ok(())
}

async fn scholar_with_citations(
    config: &Config,
    query: &SearchQuery,
    citation: CitationFormat,
) -> Result<EngineResults> {
    let scholar = GoogleScholar::new(
        HttpClient::new(&config.http)?,
        &config.engines.google_scholar.base_url,
    );

    let settings = ScholarSettings {
        citation_format: citation,
        per_page_results: Some(query.num_results),
    };
    if !scholar.apply_settings(&settings).await? {
        warn!("Google Scholar settings could not be applied, citations may be missing");
    }

    let mut results = search_timed(&scholar, query).await;
    for article in &mut results.articles {
        if let Err(e) = scholar.fetch_citation(article).await {
            warn!("Citation export failed for \"{}\": {}", article.title, e);
        }
    }
    Ok(results)
}

fn print_articles(articles: &[Article], format: OutputFormat, csv_header_printed: &mut bool) {
    for article in articles {
        match format {
            OutputFormat::Txt => println!("{}\n", article.as_txt()),
            OutputFormat::Csv => println!("{}", article.as_csv(false, '|')),
            OutputFormat::CsvHeader => {
                println!("{}", article.as_csv(!*csv_header_printed, '|'));
                *csv_header_printed = true;
            }
            OutputFormat::Citation => println!("{}", article.as_citation()),
        }
    }
}

fn cmd_dataset(config: &Config, level: QueryLevel, count_only: bool) -> Result<()> {
    let dataset = QueryDataset::load(&config.dataset, level)
        .context("Failed to load query dataset")?
        .limit(config.experiment.query_limit);

    if count_only {
        println!("{}", dataset.len());
        return Ok(());
    }

    for query in &dataset.queries {
        println!("{}", query);
    }
    info!("{} queries from {}", dataset.len(), dataset.source);
    Ok(())
}

fn cmd_analyze(
    config: &Config,
    path: &Path,
    match_mode: Option<MatchMode>,
    max_results: Option<usize>,
) -> Result<()> {
    let report = JsonExporter::read(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;

    let mode = match_mode.unwrap_or(report.settings.match_mode);
    let max_results = max_results.unwrap_or(report.settings.max_results);
    if max_results == 0 || max_results > report.settings.max_results {
        bail!(
            "max_results must be between 1 and {} for this report",
            report.settings.max_results
        );
    }

    let threshold = if mode == MatchMode::Fuzzy && report.settings.match_mode != MatchMode::Fuzzy {
        config.experiment.fuzzy_threshold
    } else {
        report.settings.fuzzy_threshold
    };
    let matcher = TitleMatcher::new(mode, threshold);

    info!(
        "Re-analyzing {} queries from run {} (match mode {}, top {})",
        report.records.len(),
        report.run_id,
        mode,
        max_results
    );
    let (_, summary) = reanalyze(
        &report.records,
        &report.settings.engines,
        max_results,
        &matcher,
    );

    println!("\n{}\n", format_summary_table(&summary));
    Ok(())
}

fn cmd_check(config: &Config) -> Result<()> {
    let report = HealthReport::for_config(config, env!("CARGO_PKG_VERSION"));
    println!("{}", report.format());

    if !report.is_healthy() {
        println!("{}", format_error("Setup has errors"));
        bail!("setup check failed");
    }

    println!("{}", format_success("Ready to run"));
    Ok(())
}
