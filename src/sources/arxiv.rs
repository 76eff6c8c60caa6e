//! arXiv research source implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{Paper, PaperRecord};
use crate::sources::{PaperSource, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
/// Base URL for arXiv PDFs
const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";
/// Entries requested per API call; larger searches are paged
const ARXIV_PAGE_SIZE: usize = 100;
/// Pause between page requests, as asked by the arXiv API terms of use
const ARXIV_PAGE_DELAY: Duration = Duration::from_secs(3);

/// arXiv research source, searching by relevance
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    api_url: String,
    page_size: usize,
    page_delay: Duration,
}

impl ArxivSource {
    /// Create a new arXiv source using the shared HTTP client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_api_url(client, ARXIV_API_URL)
    }

    /// Create with a custom API endpoint (for testing)
    pub fn with_api_url(client: Arc<HttpClient>, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            page_size: ARXIV_PAGE_SIZE,
            page_delay: ARXIV_PAGE_DELAY,
        }
    }

    /// Override the page size and the pause between page requests
    pub fn with_paging(mut self, page_size: usize, page_delay: Duration) -> Self {
        self.page_size = page_size.max(1);
        self.page_delay = page_delay;
        self
    }

    fn build_url(&self, topic: &str, start: usize, max_results: usize) -> String {
        let search_query = format!("all:{}", topic);
        format!(
            "{}?search_query={}&start={}&max_results={}&sortBy=relevance&sortOrder=descending",
            self.api_url,
            urlencoding::encode(&search_query),
            start,
            max_results
        )
    }

    /// Fetch one page of results starting at `start`
    async fn fetch_page(
        &self,
        topic: &str,
        start: usize,
        page_size: usize,
    ) -> Result<Vec<Paper>, SourceError> {
        let url = self.build_url(topic, start, page_size);
        tracing::debug!("arXiv search: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let feed = parser::parse(bytes.as_ref())
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        feed.entries
            .iter()
            .take(page_size)
            .map(Self::parse_entry)
            .collect()
    }

    /// Short id from an entry URL: `http://arxiv.org/abs/2301.12345v1` -> `2301.12345v1`
    fn short_id(entry_id: &str) -> Result<String, SourceError> {
        entry_id
            .split("/abs/")
            .nth(1)
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SourceError::Parse(format!("Unexpected entry id: {}", entry_id)))
    }

    fn format_date(date: DateTime<Utc>) -> String {
        date.date_naive().format("%Y-%m-%d").to_string()
    }

    fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Parse arXiv Atom feed entry into a Paper
    fn parse_entry(entry: &feed_rs::model::Entry) -> Result<Paper, SourceError> {
        // The API reports query errors as a single entry rather than an HTTP status
        if entry.id.contains("/api/errors") {
            let message = entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(SourceError::Api(message));
        }

        let paper_id = Self::short_id(&entry.id)?;

        let title = entry
            .title
            .as_ref()
            .map(|t| Self::collapse_whitespace(&t.content))
            .unwrap_or_default();

        let authors = entry.authors.iter().map(|a| a.name.trim().to_string());

        let summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.trim().to_string())
            .unwrap_or_default();

        let pdf_url = entry
            .links
            .iter()
            .find(|link| {
                link.title.as_deref() == Some("pdf")
                    || link.media_type.as_deref() == Some("application/pdf")
            })
            .map(|link| link.href.clone())
            .unwrap_or_else(|| format!("{}/{}", ARXIV_PDF_URL, paper_id));

        let published = entry
            .published
            .or(entry.updated)
            .map(Self::format_date)
            .ok_or_else(|| SourceError::Parse(format!("Missing published date for {}", paper_id)))?;

        let record = PaperRecord::new(title)
            .authors(authors)
            .summary(summary)
            .pdf_url(pdf_url)
            .published(published);

        Ok(Paper::new(paper_id, record))
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        if topic.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty search topic".to_string()));
        }
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let mut papers = Vec::new();
        while papers.len() < max_results {
            if !papers.is_empty() && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let wanted = (max_results - papers.len()).min(self.page_size);
            let page = self.fetch_page(topic, papers.len(), wanted).await?;
            let exhausted = page.len() < wanted;
            papers.extend(page);
            if exhausted {
                break;
            }
        }

        tracing::debug!("arXiv returned {} papers for '{}'", papers.len(), topic);
        Ok(papers)
    }
}
