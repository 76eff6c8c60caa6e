//! Tools offered to the model.
//!
//! Two tools are declared:
//!
//! - `search_papers`: search arXiv for a topic and store the results
//! - `extract_info`: look up stored metadata for a paper id
//!
//! A tool invocation is parsed into the closed [`ToolCall`] enum before it
//! runs, so an unknown name or malformed arguments fail up front.

mod output;

pub use output::{ToolOutput, EMPTY_RESULT_TEXT};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::TopicPapers;
use crate::sources::{PaperSource, SourceError, DEFAULT_MAX_RESULTS};
use crate::store::{PaperStore, StoreError};

/// Name of the search tool
pub const SEARCH_PAPERS: &str = "search_papers";
/// Name of the lookup tool
pub const EXTRACT_INFO: &str = "extract_info";

/// Declaration of a tool, as sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (e.g., "search_papers")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,
}

/// Arguments of `search_papers`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchPapersArgs {
    pub topic: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Arguments of `extract_info`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractInfoArgs {
    pub paper_id: String,
}

/// A parsed tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    SearchPapers(SearchPapersArgs),
    ExtractInfo(ExtractInfoArgs),
}

impl ToolCall {
    /// Parse a tool invocation from its name and JSON arguments
    pub fn parse(name: &str, input: &Value) -> Result<Self, ToolError> {
        let invalid = |e: serde_json::Error| ToolError::InvalidArguments {
            tool: name.to_string(),
            message: e.to_string(),
        };

        match name {
            SEARCH_PAPERS => Ok(ToolCall::SearchPapers(
                SearchPapersArgs::deserialize(input).map_err(invalid)?,
            )),
            EXTRACT_INFO => Ok(ToolCall::ExtractInfo(
                ExtractInfoArgs::deserialize(input).map_err(invalid)?,
            )),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }

    /// Tool name of this call
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::SearchPapers(_) => SEARCH_PAPERS,
            ToolCall::ExtractInfo(_) => EXTRACT_INFO,
        }
    }
}

/// Errors raised while running a tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool with this name is declared
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments do not match the tool's schema
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The paper source failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Search results could not be persisted
    #[error("Failed to save papers: {0}")]
    Store(#[from] StoreError),
}

/// Registry of the tools available to the model
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    source: Arc<dyn PaperSource>,
    store: PaperStore,
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Create a registry searching `source` and persisting into `store`
    pub fn new(source: Arc<dyn PaperSource>, store: PaperStore) -> Self {
        Self {
            source,
            store,
            definitions: definitions(),
        }
    }

    /// Declarations of all tools
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// The store backing the tools
    pub fn store(&self) -> &PaperStore {
        &self.store
    }

    /// Run a parsed tool call
    pub async fn execute(&self, call: ToolCall) -> Result<ToolOutput, ToolError> {
        match call {
            ToolCall::SearchPapers(args) => self.search_papers(args).await,
            ToolCall::ExtractInfo(args) => Ok(self.extract_info(args)),
        }
    }

    /// Parse, run, and render a tool invocation by name
    pub async fn dispatch(&self, name: &str, input: &Value) -> Result<String, ToolError> {
        let call = ToolCall::parse(name, input)?;
        let output = self.execute(call).await?;
        Ok(output.to_text())
    }

    async fn search_papers(&self, args: SearchPapersArgs) -> Result<ToolOutput, ToolError> {
        let papers = self.source.search(&args.topic, args.max_results).await?;
        tracing::debug!(
            source = self.source.id(),
            "{} returned {} papers for '{}'",
            self.source.name(),
            papers.len(),
            args.topic
        );

        let ids: Vec<String> = papers.iter().map(|p| p.paper_id.clone()).collect();
        let records: TopicPapers = papers
            .into_iter()
            .map(|p| (p.paper_id, p.record))
            .collect();

        self.store.save(&args.topic, records)?;
        Ok(ToolOutput::PaperIds(ids))
    }

    fn extract_info(&self, args: ExtractInfoArgs) -> ToolOutput {
        match self.store.find(&args.paper_id) {
            Some(record) => ToolOutput::Record(record),
            None => ToolOutput::Message(format!(
                "There's no saved information related to paper {}.",
                args.paper_id
            )),
        }
    }
}

fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SEARCH_PAPERS.to_string(),
            description:
                "Search for papers on arXiv based on a topic and store their information."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "The topic to search for"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results to retrieve",
                        "default": DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["topic"]
            }),
        },
        ToolDefinition {
            name: EXTRACT_INFO.to_string(),
            description:
                "Search for information about a specific paper across all topic directories."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "paper_id": {
                        "type": "string",
                        "description": "The ID of the paper to look for"
                    }
                },
                "required": ["paper_id"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_paper, MockSource};
    use tempfile::TempDir;

    fn registry(source: MockSource, dir: &TempDir) -> ToolRegistry {
        ToolRegistry::new(Arc::new(source), PaperStore::new(dir.path()))
    }

    #[test]
    fn test_parse_search_defaults_max_results() {
        let call = ToolCall::parse(SEARCH_PAPERS, &json!({"topic": "llm"})).unwrap();
        assert_eq!(
            call,
            ToolCall::SearchPapers(SearchPapersArgs {
                topic: "llm".to_string(),
                max_results: 5,
            })
        );
        assert_eq!(call.name(), "search_papers");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ToolCall::parse("download_paper", &json!({})),
            Err(ToolError::UnknownTool(name)) if name == "download_paper"
        ));
        assert!(matches!(
            ToolCall::parse(EXTRACT_INFO, &json!({})),
            Err(ToolError::InvalidArguments { .. })
        ));
        assert!(matches!(
            ToolCall::parse(EXTRACT_INFO, &json!({"paper_id": "x", "extra": 1})),
            Err(ToolError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_definitions_match_declared_tools() {
        let dir = TempDir::new().unwrap();
        let registry = registry(MockSource::new(), &dir);
        let names: Vec<&str> = registry
            .definitions()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["search_papers", "extract_info"]);
        assert_eq!(
            registry.definitions()[0].input_schema["required"],
            json!(["topic"])
        );
    }

    #[tokio::test]
    async fn test_dispatch_search_then_extract() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::with_papers(vec![
            make_paper("2401.00001v1", "First"),
            make_paper("2401.00002v1", "Second"),
            make_paper("2401.00003v1", "Third"),
        ]);
        let registry = registry(source, &dir);

        let text = registry
            .dispatch(
                SEARCH_PAPERS,
                &json!({"topic": "Quantum Computing", "max_results": 2}),
            )
            .await
            .unwrap();
        assert_eq!(text, "2401.00001v1, 2401.00002v1");
        assert_eq!(registry.store().topics(), vec!["quantum_computing"]);

        let info = registry
            .dispatch(EXTRACT_INFO, &json!({"paper_id": "2401.00002v1"}))
            .await
            .unwrap();
        let record: serde_json::Value = serde_json::from_str(&info).unwrap();
        assert_eq!(record["title"], "Second");
    }

    #[tokio::test]
    async fn test_dispatch_extract_unknown_paper() {
        let dir = TempDir::new().unwrap();
        let registry = registry(MockSource::new(), &dir);

        let text = registry
            .dispatch(EXTRACT_INFO, &json!({"paper_id": "9999.99999"}))
            .await
            .unwrap();
        assert_eq!(text, "There's no saved information related to paper 9999.99999.");
    }

    #[tokio::test]
    async fn test_dispatch_search_without_results() {
        let dir = TempDir::new().unwrap();
        let registry = registry(MockSource::new(), &dir);

        let text = registry
            .dispatch(SEARCH_PAPERS, &json!({"topic": "nothing here"}))
            .await
            .unwrap();
        assert_eq!(text, EMPTY_RESULT_TEXT);

        // The topic file is still written, as an empty object
        assert_eq!(registry.store().topics(), vec!["nothing_here"]);
        let path = registry.store().topic_path("nothing here");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_dispatch_propagates_source_errors() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::new();
        source.fail_with("service unavailable");
        let registry = registry(source, &dir);

        let result = registry
            .dispatch(SEARCH_PAPERS, &json!({"topic": "llm"}))
            .await;
        assert!(matches!(result, Err(ToolError::Source(SourceError::Api(_)))));
        assert!(registry.store().topics().is_empty());
    }
}
