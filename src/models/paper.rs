//! Paper metadata as it is stored on disk and handed back to the model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata for a single paper.
///
/// This is the on-disk shape of a topic file entry, so the field names are
/// part of the storage format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper title
    pub title: String,

    /// Author names, in publication order
    pub authors: Vec<String>,

    /// Abstract text
    pub summary: String,

    /// Direct PDF URL
    pub pdf_url: String,

    /// Publication date (`YYYY-MM-DD`)
    pub published: String,
}

/// Paper identifier to record mapping for one topic.
pub type TopicPapers = BTreeMap<String, PaperRecord>;

/// A search hit: a provider-assigned identifier plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Provider identifier (arXiv short id, e.g. `2301.12345v1`)
    pub paper_id: String,

    /// Paper metadata
    #[serde(flatten)]
    pub record: PaperRecord,
}

impl Paper {
    /// Create a new paper
    pub fn new(paper_id: impl Into<String>, record: PaperRecord) -> Self {
        Self {
            paper_id: paper_id.into(),
            record,
        }
    }
}

impl PaperRecord {
    /// Create a record with the given title and empty remaining fields
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            summary: String::new(),
            pdf_url: String::new(),
            published: String::new(),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the abstract
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the PDF URL
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.pdf_url = url.into();
        self
    }

    /// Set the publication date
    pub fn published(mut self, date: impl Into<String>) -> Self {
        self.published = date.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_field_names() {
        let record = PaperRecord::new("Attention Is All You Need")
            .authors(["Ashish Vaswani", "Noam Shazeer"])
            .summary("Transformers.")
            .pdf_url("https://arxiv.org/pdf/1706.03762v7")
            .published("2017-06-12");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["title"], "Attention Is All You Need");
        assert_eq!(value["authors"][1], "Noam Shazeer");
        assert_eq!(value["summary"], "Transformers.");
        assert_eq!(value["pdf_url"], "https://arxiv.org/pdf/1706.03762v7");
        assert_eq!(value["published"], "2017-06-12");
        assert_eq!(value.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_record_rejects_missing_fields() {
        let result: Result<PaperRecord, _> = serde_json::from_str(r#"{"title": "Only a title"}"#);
        assert!(result.is_err());
    }
}
