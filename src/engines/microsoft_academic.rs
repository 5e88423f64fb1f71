// file: src/engines/microsoft_academic.rs
// description: Microsoft Academic search result page scraping
// reference: https://academic.microsoft.com search page markup

use crate::engines::SearchEngine;
use crate::engines::google_scholar::path_to_url;
use crate::engines::http::{HttpClient, build_url};
use crate::error::Result;
use crate::models::{Article, EngineKind, EngineResults, SearchQuery};
use crate::parser::patterns::WHITESPACE;
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::debug;

lazy_static! {
    static ref TITLE_LINK: Selector =
        Selector::parse("a.blue-title").expect("TITLE_LINK selector is valid");
}

pub struct MicrosoftAcademic {
    http: HttpClient,
    base_url: String,
}

impl MicrosoftAcademic {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn query_url(&self, query: &SearchQuery) -> Result<Url> {
        query.validate()?;
        build_url(
            EngineKind::MicrosoftAcademic,
            &self.base_url,
            &[("q", query.text())],
        )
    }

    /// Collects result titles in page order.
    pub fn parse_page(query: &str, html: &str, base_url: &str) -> EngineResults {
        let document = Html::parse_document(html);

        let articles = document
            .select(&TITLE_LINK)
            .map(|link| {
                let title = link.text().collect::<String>();
                let mut article = Article::new(WHITESPACE.replace_all(title.trim(), " ").into_owned());
                if let Some(href) = link.value().attr("href") {
                    article = article.with_url(path_to_url(base_url, href));
                }
                article
            })
            .collect();

        EngineResults::from_articles(EngineKind::MicrosoftAcademic, query, articles)
    }
}

#[async_trait]
impl SearchEngine for MicrosoftAcademic {
    fn kind(&self) -> EngineKind {
        EngineKind::MicrosoftAcademic
    }

    async fn search(&self, query: &SearchQuery) -> Result<EngineResults> {
        let url = self.query_url(query)?;
        let html = self
            .http
            .get_text(EngineKind::MicrosoftAcademic, url, &[])
            .await?;

        let results = Self::parse_page(&query.text(), &html, &self.base_url);
        debug!("Parsed {} Microsoft Academic results", results.articles.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::http::tests::test_http_config;
    use crate::models::ResultStatus;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
          <div class="primary_paper">
            <a class="blue-title" href="/paper/2041">A   survey of
              <b>sentiment</b> analysis</a>
          </div>
          <div class="primary_paper">
            <a class="blue-title" href="https://example.org/p/7">Opinion mining</a>
          </div>
          <a class="grey-title" href="/author/1">Not a result</a>
        </body></html>
    "#;

    #[test]
    fn test_parse_page() {
        let results =
            MicrosoftAcademic::parse_page("sentiment", PAGE, "https://academic.microsoft.com");
        let titles: Vec<&str> = results.articles.iter().map(|a| a.title.as_str()).collect();

        assert_eq!(results.status, ResultStatus::Ok);
        assert_eq!(titles, vec!["A survey of sentiment analysis", "Opinion mining"]);
        assert_eq!(
            results.articles[0].url.as_deref(),
            Some("https://academic.microsoft.com/paper/2041")
        );
        assert_eq!(
            results.articles[1].url.as_deref(),
            Some("https://example.org/p/7")
        );
    }

    #[test]
    fn test_page_without_results_is_empty() {
        let results = MicrosoftAcademic::parse_page("q", "<html></html>", "https://x.org");
        assert_eq!(results.status, ResultStatus::Empty);
    }

    #[tokio::test]
    async fn test_search_queries_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "sentiment"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let engine = MicrosoftAcademic::new(
            HttpClient::new(&test_http_config()).unwrap(),
            &format!("{}/search", server.uri()),
        );
        let results = engine
            .search(&SearchQuery::keywords("sentiment"))
            .await
            .unwrap();
        assert_eq!(results.articles.len(), 2);
    }
}
