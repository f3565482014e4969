//! Classification and outcome types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type driving which extractor handles a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Html,
    Pdf,
    Video,
}

impl ContentKind {
    /// Every kind, in dispatch order
    pub const ALL: [ContentKind; 3] = [ContentKind::Html, ContentKind::Pdf, ContentKind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Pdf => "pdf",
            ContentKind::Video => "video",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw URL after normalization and classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedUrl {
    /// URL after type-specific rewriting; the dedup and dispatch key
    pub normalized_url: String,

    /// Content type
    pub kind: ContentKind,

    /// Position of the first raw URL that produced this entry
    pub original_index: usize,
}

/// Why an entry has no content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Success
    #[default]
    None,

    /// Policy decision: skip-listed pattern or disabled content type
    Skipped,

    /// Per-request deadline exceeded
    Timeout,

    /// Non-success status or connection failure
    TransportError,

    /// Extractor rejected the payload or found nothing
    ExtractError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::None => "none",
            ErrorKind::Skipped => "skipped",
            ErrorKind::Timeout => "timeout",
            ErrorKind::TransportError => "transport_error",
            ErrorKind::ExtractError => "extract_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one URL
///
/// `ok == false` always comes with an empty `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// URL as supplied by the caller
    pub url: String,

    /// URL actually fetched after normalization
    pub resolved_url: String,

    /// Extracted text, empty unless `ok`
    pub content: String,

    pub ok: bool,

    pub error_kind: ErrorKind,

    /// Diagnostic for failures
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl FetchOutcome {
    /// Create a successful outcome
    pub fn success(url: impl Into<String>, content: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            resolved_url: url.clone(),
            url,
            content: content.into(),
            ok: true,
            error_kind: ErrorKind::None,
            message: None,
        }
    }

    /// Create a failed outcome with empty content
    pub fn failure(url: impl Into<String>, error_kind: ErrorKind, message: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            resolved_url: url.clone(),
            url,
            content: String::new(),
            ok: false,
            error_kind,
            message: Some(message.into()),
        }
    }

    /// Create a skipped outcome
    pub fn skipped(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::failure(url, ErrorKind::Skipped, reason)
    }

    /// Re-attribute a computed outcome to the caller's raw URL
    pub(crate) fn for_input(&self, raw_url: &str) -> Self {
        Self {
            url: raw_url.to_string(),
            ..self.clone()
        }
    }

    /// Number of characters of extracted text
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// One outcome per input URL, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedBatch {
    outcomes: Vec<FetchOutcome>,
}

impl ResolvedBatch {
    pub(crate) fn new(outcomes: Vec<FetchOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FetchOutcome> {
        self.outcomes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FetchOutcome> {
        self.outcomes.iter()
    }

    /// Count of entries that produced content
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }

    /// Count of entries with the given error kind
    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.outcomes.iter().filter(|o| o.error_kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<FetchOutcome> {
        self.outcomes
    }
}

impl std::ops::Index<usize> for ResolvedBatch {
    type Output = FetchOutcome;

    fn index(&self, index: usize) -> &Self::Output {
        &self.outcomes[index]
    }
}

impl IntoIterator for ResolvedBatch {
    type Item = FetchOutcome;
    type IntoIter = std::vec::IntoIter<FetchOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedBatch {
    type Item = &'a FetchOutcome;
    type IntoIter = std::slice::Iter<'a, FetchOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_empty_content() {
        let outcome = FetchOutcome::failure("https://a.com", ErrorKind::Timeout, "slow");
        assert!(!outcome.ok);
        assert!(outcome.content.is_empty());
        assert_eq!(outcome.message.as_deref(), Some("slow"));
    }

    #[test]
    fn test_for_input_keeps_resolved_url() {
        let outcome = FetchOutcome::success("https://arxiv.org/pdf/1234.5678", "text");
        let copy = outcome.for_input("https://arxiv.org/abs/1234.5678");
        assert_eq!(copy.url, "https://arxiv.org/abs/1234.5678");
        assert_eq!(copy.resolved_url, "https://arxiv.org/pdf/1234.5678");
        assert_eq!(copy.content, "text");
    }

    #[test]
    fn test_error_kind_display_matches_serde() {
        for kind in [
            ErrorKind::None,
            ErrorKind::Skipped,
            ErrorKind::Timeout,
            ErrorKind::TransportError,
            ErrorKind::ExtractError,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }

    #[test]
    fn test_outcome_json_shape() {
        let batch = ResolvedBatch::new(vec![
            FetchOutcome::success("https://a.com", "hello"),
            FetchOutcome::skipped("https://youtube.com/watch?v=abc", "video extraction disabled"),
        ]);
        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["error_kind"], "none");
        assert!(json[0].get("message").is_none());
        assert_eq!(json[1]["error_kind"], "skipped");
        assert_eq!(batch.succeeded(), 1);
        assert_eq!(batch.count_kind(ErrorKind::Skipped), 1);
    }
}
