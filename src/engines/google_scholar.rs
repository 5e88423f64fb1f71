// file: src/engines/google_scholar.rs
// description: Google Scholar result page scraping and session settings
// reference: https://scholar.google.com advanced search parameters

use crate::engines::SearchEngine;
use crate::engines::http::{HttpClient, build_url, endpoint};
use crate::error::{OverlapError, Result};
use crate::models::{Article, EngineKind, EngineResults, SearchQuery, parenthesize_phrases};
use crate::parser::patterns::{ALL_VERSIONS, CITED_BY, RESULT_COUNT, WHITESPACE, YEAR};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use tracing::{debug, info};

lazy_static! {
    static ref RESULT: Selector = Selector::parse("div.gs_r").expect("RESULT selector is valid");
    static ref RESULT_BODY: Selector =
        Selector::parse("div.gs_ri").expect("RESULT_BODY selector is valid");
    static ref TITLE: Selector = Selector::parse("h3.gs_rt").expect("TITLE selector is valid");
    static ref ANCHOR: Selector = Selector::parse("a").expect("ANCHOR selector is valid");
    static ref AUTHORS: Selector = Selector::parse("div.gs_a").expect("AUTHORS selector is valid");
    static ref LINKS: Selector = Selector::parse("div.gs_fl").expect("LINKS selector is valid");
    static ref EXCERPT: Selector = Selector::parse("div.gs_rs").expect("EXCERPT selector is valid");
    static ref SIDE_LINKS: Selector =
        Selector::parse("div.gs_ggs a, div.gs_ttss a").expect("SIDE_LINKS selector is valid");
    static ref SUMMARY: Selector =
        Selector::parse("div#gs_ab_md").expect("SUMMARY selector is valid");
    static ref SETTINGS_SCISIG: Selector =
        Selector::parse(r#"form#gs_settings_form input[type="hidden"][name="scisig"]"#)
            .expect("SETTINGS_SCISIG selector is valid");
}

/// Citation export formats offered in the Scholar settings pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationFormat {
    #[default]
    None = 0,
    RefWorks = 1,
    RefMan = 2,
    EndNote = 3,
    BibTex = 4,
}

impl FromStr for CitationFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bt" | "bibtex" => Ok(CitationFormat::BibTex),
            "en" | "endnote" => Ok(CitationFormat::EndNote),
            "rm" | "refman" => Ok(CitationFormat::RefMan),
            "rw" | "refworks" => Ok(CitationFormat::RefWorks),
            other => Err(format!(
                "invalid citation link format '{}', must be one of \"bt\", \"en\", \"rm\", or \"rw\"",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScholarSettings {
    pub citation_format: CitationFormat,
    pub per_page_results: Option<usize>,
}

impl ScholarSettings {
    pub fn is_configured(&self) -> bool {
        self.citation_format != CitationFormat::None || self.per_page_results.is_some()
    }
}

#[derive(Debug, Default)]
pub struct ParsedPage {
    pub articles: Vec<Article>,
    pub total_results: Option<u64>,
}

pub struct GoogleScholar {
    http: HttpClient,
    base_url: String,
}

impl GoogleScholar {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn query_url(&self, query: &SearchQuery) -> Result<Url> {
        query.validate()?;

        let opt = |value: &Option<String>| value.clone().unwrap_or_default();
        let year = |value: Option<i32>| value.map(|y| y.to_string()).unwrap_or_default();

        let params: Vec<(&str, String)> = vec![
            ("as_q", opt(&query.words)),
            ("as_epq", opt(&query.phrase)),
            (
                "as_oq",
                query.words_some.as_deref().map(parenthesize_phrases).unwrap_or_default(),
            ),
            (
                "as_eq",
                query.words_none.as_deref().map(parenthesize_phrases).unwrap_or_default(),
            ),
            (
                "as_occt",
                if query.title_only { "title" } else { "any" }.to_string(),
            ),
            ("as_sauthors", opt(&query.author)),
            ("as_publication", opt(&query.publication)),
            ("as_ylo", year(query.year_start)),
            ("as_yhi", year(query.year_end)),
            (
                "as_sdt",
                format!("{},5", if query.include_patents { 0 } else { 1 }),
            ),
            (
                "as_vis",
                if query.include_citations { "0" } else { "1" }.to_string(),
            ),
            ("btnG", String::new()),
            ("hl", "en".to_string()),
            ("num", query.num_results.to_string()),
        ];

        build_url(
            EngineKind::GoogleScholar,
            &endpoint(&self.base_url, "scholar"),
            &params,
        )
    }

    /// Parses a results page; `base_url` resolves relative links.
    pub fn parse_page(html: &str, base_url: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        let total_results = document
            .select(&SUMMARY)
            .next()
            .and_then(|summary| parse_result_count(&element_text(summary)));

        let articles = document
            .select(&RESULT)
            .filter_map(|result| parse_article(result, base_url))
            .collect();

        ParsedPage {
            articles,
            total_results,
        }
    }

    /// Applies citation export and page size preferences to this session.
    pub async fn apply_settings(&self, settings: &ScholarSettings) -> Result<bool> {
        if !settings.is_configured() {
            return Ok(true);
        }

        let form_url = build_url(
            EngineKind::GoogleScholar,
            &endpoint(&self.base_url, "scholar_settings"),
            &[
                ("sciifh", "1".to_string()),
                ("hl", "en".to_string()),
                ("as_sdt", "0,5".to_string()),
            ],
        )?;

        let html = self
            .http
            .get_text(EngineKind::GoogleScholar, form_url, &[])
            .await?;

        let Some(scisig) = extract_scisig(&html) else {
            info!("Parsing settings failed: no scisig token in settings form");
            return Ok(false);
        };

        let per_page = settings
            .per_page_results
            .unwrap_or(crate::models::MAX_PAGE_RESULTS)
            .min(crate::models::MAX_PAGE_RESULTS);

        let mut params = vec![
            ("q", String::new()),
            ("scisig", scisig),
            ("inststart", "0".to_string()),
            ("as_sdt", "1,5".to_string()),
            ("as_sdtp", String::new()),
            ("num", per_page.to_string()),
            (
                "scis",
                if settings.citation_format == CitationFormat::None {
                    "no"
                } else {
                    "yes"
                }
                .to_string(),
            ),
        ];
        if settings.citation_format != CitationFormat::None {
            params.push(("scisf", (settings.citation_format as u8).to_string()));
        }
        params.extend([
            ("hl", "en".to_string()),
            ("lang", "all".to_string()),
            ("instq", String::new()),
            ("save", String::new()),
        ]);

        let save_url = build_url(
            EngineKind::GoogleScholar,
            &endpoint(&self.base_url, "scholar_setprefs"),
            &params,
        )?;
        self.http
            .get_text(EngineKind::GoogleScholar, save_url, &[])
            .await?;

        info!("Google Scholar settings applied");
        Ok(true)
    }

    /// Downloads citation export data for an article that links to it.
    pub async fn fetch_citation(&self, article: &mut Article) -> Result<bool> {
        let Some(link) = article.url_citation.clone() else {
            return Ok(false);
        };
        if article.citation_data.is_some() {
            return Ok(true);
        }

        info!("Retrieving citation export data");
        let url = Url::parse(&link).map_err(|e| {
            OverlapError::parse(
                EngineKind::GoogleScholar.display_name(),
                format!("bad citation link {}: {}", link, e),
            )
        })?;
        let data = self
            .http
            .get_text(EngineKind::GoogleScholar, url, &[])
            .await?;
        article.set_citation_data(data);
        Ok(true)
    }
}

#[async_trait]
impl SearchEngine for GoogleScholar {
    fn kind(&self) -> EngineKind {
        EngineKind::GoogleScholar
    }

    async fn search(&self, query: &SearchQuery) -> Result<EngineResults> {
        let url = self.query_url(query)?;
        let html = self
            .http
            .get_text(EngineKind::GoogleScholar, url, &[])
            .await?;

        let page = Self::parse_page(&html, &self.base_url);
        debug!("Parsed {} Google Scholar results", page.articles.len());

        Ok(
            EngineResults::from_articles(EngineKind::GoogleScholar, &query.text(), page.articles)
                .with_total(page.total_results),
        )
    }
}

fn parse_article(result: ElementRef<'_>, base_url: &str) -> Option<Article> {
    let body = result.select(&RESULT_BODY).next()?;
    let heading = body.select(&TITLE).next()?;

    let mut article = match heading.select(&ANCHOR).next() {
        Some(anchor) => {
            let mut article = Article::new(collapse(&element_text(anchor)));
            if let Some(href) = anchor.value().attr("href") {
                let url = path_to_url(base_url, href);
                if url.to_ascii_lowercase().ends_with(".pdf") {
                    article.url_pdf = Some(url.clone());
                }
                article.url = Some(url);
            }
            article
        }
        // Citation-only entries carry no link; drop the [CITATION] markers.
        None => Article::new(collapse(&text_skipping_spans(heading))),
    };

    if article.title.is_empty() {
        return None;
    }

    if let Some(authors) = body.select(&AUTHORS).next() {
        article.year = YEAR
            .find(&element_text(authors))
            .and_then(|m| m.as_str().parse().ok());
    }

    for links in body.select(&LINKS) {
        parse_links(links, base_url, &mut article);
    }

    if article.url_pdf.is_none() {
        article.url_pdf = result
            .select(&SIDE_LINKS)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| path_to_url(base_url, href))
            .find(|url| url.to_ascii_lowercase().ends_with(".pdf"));
    }

    if let Some(excerpt) = body.select(&EXCERPT).next() {
        let text = element_text(excerpt).replace('\n', "");
        let text = text.trim();
        if !text.is_empty() {
            article.excerpt = Some(text.to_string());
        }
    }

    Some(article)
}

fn parse_links(links: ElementRef<'_>, base_url: &str, article: &mut Article) {
    for anchor in links.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = collapse(&element_text(anchor));

        if href.starts_with("/scholar?cites") {
            if let Some(caps) = CITED_BY.captures(&text) {
                article.num_citations = caps[1].parse().unwrap_or(0);
            }
            let url = strip_url_arg("num", &path_to_url(base_url, href));
            article.cluster_id = url
                .split_once('?')
                .and_then(|(_, args)| args.split('&').find_map(|arg| arg.strip_prefix("cites=")))
                .map(str::to_string);
            article.url_citations = Some(url);
        }

        if href.starts_with("/scholar?cluster") {
            if let Some(caps) = ALL_VERSIONS.captures(&text) {
                article.num_versions = caps[1].parse().unwrap_or(0);
            }
            article.url_versions = Some(strip_url_arg("num", &path_to_url(base_url, href)));
        }

        if text.starts_with("Import") {
            article.url_citation = Some(path_to_url(base_url, href));
        }
    }
}

fn extract_scisig(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&SETTINGS_SCISIG)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

fn parse_result_count(text: &str) -> Option<u64> {
    RESULT_COUNT
        .captures(text)
        .and_then(|caps| caps[1].replace([',', '.'], "").parse().ok())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn text_skipping_spans(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child)
            && child_element.value().name() != "span"
        {
            out.push_str(&text_skipping_spans(child_element));
        }
    }
    out
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Returns a full URL for `path`, leaving absolute URLs untouched.
pub fn path_to_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    endpoint(base_url, path)
}

/// Removes a URL-encoded argument, if present.
pub fn strip_url_arg(arg: &str, url: &str) -> String {
    let Some((head, args)) = url.split_once('?') else {
        return url.to_string();
    };
    let prefix = format!("{}=", arg);
    let kept: Vec<&str> = args.split('&').filter(|part| !part.starts_with(&prefix)).collect();
    format!("{}?{}", head, kept.join("&"))
}
