//! Per-topic persistence of paper metadata.
//!
//! # Layout
//!
//! ```text
//! papers/
//!   quantum_computing/
//!     papers_info.json
//!   graph_neural_networks/
//!     papers_info.json
//! ```
//!
//! Each `papers_info.json` is a JSON object mapping paper id to a
//! [`PaperRecord`]. Saving merges into whatever is already on disk; an
//! absent or unreadable file is treated as an empty store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{PaperRecord, TopicPapers};

/// File name of the per-topic metadata file
pub const PAPERS_FILE: &str = "papers_info.json";

/// Errors raised while writing a topic store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The merged mapping could not be serialized
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The topic has no characters usable in a directory name
    #[error("Invalid topic: {0:?}")]
    InvalidTopic(String),
}

/// Flat-file store of paper metadata, one JSON file per search topic
#[derive(Debug, Clone)]
pub struct PaperStore {
    root: PathBuf,
}

impl PaperStore {
    /// Create a store rooted at the given directory (created lazily on save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a topic to its directory name.
    ///
    /// The topic is lower-cased and every character outside `[a-z0-9_-]`
    /// (spaces, path separators, dots) becomes `_`, so the key is always a
    /// single path component below the store root.
    pub fn topic_key(topic: &str) -> String {
        topic
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Path of the metadata file for a topic
    pub fn topic_path(&self, topic: &str) -> PathBuf {
        self.root.join(Self::topic_key(topic)).join(PAPERS_FILE)
    }

    /// Load the stored papers for a topic, or an empty map if none are readable
    pub fn load_topic(&self, topic: &str) -> TopicPapers {
        let path = self.topic_path(topic);
        match read_papers_file(&path) {
            Ok(papers) => papers,
            Err(ReadFailure::Missing) => TopicPapers::new(),
            Err(ReadFailure::Unreadable(e)) => {
                tracing::warn!(
                    "Discarding unreadable metadata file {}: {}",
                    path.display(),
                    e
                );
                TopicPapers::new()
            }
        }
    }

    /// Merge `papers` into the topic's file, replacing entries with the same id.
    ///
    /// Returns the path of the written file.
    pub fn save(&self, topic: &str, papers: TopicPapers) -> Result<PathBuf, StoreError> {
        let key = Self::topic_key(topic);
        if key.is_empty() {
            return Err(StoreError::InvalidTopic(topic.to_string()));
        }

        let dir = self.root.join(key);
        fs::create_dir_all(&dir)?;

        let path = dir.join(PAPERS_FILE);
        let mut merged = self.load_topic(topic);
        merged.extend(papers);

        let content = serde_json::to_string_pretty(&merged)?;

        // Write next to the target and rename over it so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        tracing::info!("Results are saved in: {}", path.display());
        Ok(path)
    }

    /// Find a paper by id across all topics.
    ///
    /// Topics are scanned in name order; the first match wins. Topics whose
    /// file is missing or unreadable are skipped.
    pub fn find(&self, paper_id: &str) -> Option<PaperRecord> {
        for dir in self.topic_dirs() {
            let path = dir.join(PAPERS_FILE);
            match read_papers_file(&path) {
                Ok(mut papers) => {
                    if let Some(record) = papers.remove(paper_id) {
                        tracing::debug!("Found {} in {}", paper_id, path.display());
                        return Some(record);
                    }
                }
                Err(ReadFailure::Missing) => {
                    tracing::debug!("No metadata file in {}", dir.display());
                }
                Err(ReadFailure::Unreadable(e)) => {
                    tracing::warn!("Error reading {}: {}", path.display(), e);
                }
            }
        }
        None
    }

    /// Names of the topic directories currently in the store
    pub fn topics(&self) -> Vec<String> {
        self.topic_dirs()
            .iter()
            .filter_map(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    fn topic_dirs(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();
        dirs
    }
}

impl Default for PaperStore {
    fn default() -> Self {
        Self::new("papers")
    }
}

enum ReadFailure {
    Missing,
    Unreadable(String),
}

fn read_papers_file(path: &Path) -> Result<TopicPapers, ReadFailure> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ReadFailure::Missing),
        Err(e) => return Err(ReadFailure::Unreadable(e.to_string())),
    };
    serde_json::from_str(&content).map_err(|e| ReadFailure::Unreadable(e.to_string()))
}
