//! Paper search providers.
//!
//! The [`PaperSource`] trait is the seam between the tools and the outside
//! world: [`ArxivSource`] talks to the arXiv API, [`MockSource`] serves
//! canned results in tests.

mod arxiv;
pub mod mock;

pub use arxiv::ArxivSource;
pub use mock::MockSource;

use async_trait::async_trait;

use crate::models::Paper;

/// Default number of results fetched per search
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A provider that can search for papers by topic.
#[async_trait]
pub trait PaperSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for papers on `topic`, most relevant first, at most `max_results` of them
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (Atom feed, dates)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}
