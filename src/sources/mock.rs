//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Paper, PaperRecord};
use crate::sources::{PaperSource, SourceError};

/// A mock source that returns predefined papers and counts searches.
#[derive(Debug, Default)]
pub struct MockSource {
    papers: Mutex<Vec<Paper>>,
    fail_with: Mutex<Option<String>>,
    searches: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source with no papers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source returning the given papers.
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        let source = Self::new();
        source.set_papers(papers);
        source
    }

    /// Set the papers to return.
    pub fn set_papers(&self, papers: Vec<Paper>) {
        let mut guard = self.papers.lock().unwrap();
        *guard = papers;
    }

    /// Make every subsequent search fail with an API error.
    pub fn fail_with(&self, message: impl Into<String>) {
        let mut guard = self.fail_with.lock().unwrap();
        *guard = Some(message.into());
    }

    /// Number of searches performed so far.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaperSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, _topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        self.searches.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(SourceError::Api(message));
        }

        let guard = self.papers.lock().unwrap();
        Ok(guard.iter().take(max_results).cloned().collect())
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(paper_id: &str, title: &str) -> Paper {
    Paper::new(
        paper_id,
        PaperRecord::new(title)
            .authors(["Test Author"])
            .summary(format!("Abstract of {}", title))
            .pdf_url(format!("http://arxiv.org/pdf/{}", paper_id))
            .published("2024-01-01"),
    )
}
