//! PDF document text extraction

use crate::error::ExtractError;

/// Turns raw document bytes into text, page by page
pub trait DocumentExtractor: Send + Sync {
    fn extract_text(&self, raw: &[u8]) -> Result<String, ExtractError>;
}

/// [`DocumentExtractor`] built on `lopdf`
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Default)]
pub struct LopdfExtractor;

#[cfg(feature = "pdf")]
impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "pdf")]
impl DocumentExtractor for LopdfExtractor {
    fn extract_text(&self, raw: &[u8]) -> Result<String, ExtractError> {
        let doc = lopdf::Document::load_mem(raw)?;

        // get_pages is keyed by page number, so iteration is in page order
        let mut text_parts: Vec<String> = Vec::new();
        for page_num in doc.get_pages().keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(page_text) => {
                    let cleaned = clean_page(&page_text);
                    if !cleaned.is_empty() {
                        text_parts.push(cleaned);
                    }
                }
                Err(e) => tracing::debug!(page = page_num, error = %e, "skipping unreadable page"),
            }
        }

        if text_parts.is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text_parts.join("\n"))
    }
}

/// Stand-in used when the crate is built without the `pdf` feature
#[derive(Debug, Clone, Default)]
pub struct UnsupportedDocuments;

impl DocumentExtractor for UnsupportedDocuments {
    fn extract_text(&self, _raw: &[u8]) -> Result<String, ExtractError> {
        Err(ExtractError::Pdf(
            "built without the `pdf` feature".to_string(),
        ))
    }
}

/// Collapse runs of spaces and tabs while keeping line structure
fn clean_page(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
