//! Resolver configuration

use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default in-flight cap per content-type partition
pub const DEFAULT_MAX_CONCURRENT_PER_TYPE: usize = 16;

/// Configuration for a batch resolution run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extract PDF documents; also enables the arxiv abstract -> pdf rewrite
    pub extract_documents: bool,

    /// Retrieve transcripts for video watch pages
    pub extract_videos: bool,

    /// Rewrite arxiv html links to the abstract page instead of the pdf
    pub prefer_html_over_pdf_for_arxiv: bool,

    /// Deadline for fetching and extracting a single URL, in seconds
    pub per_request_timeout_secs: u64,

    /// Maximum simultaneously in-flight tasks per content type; `None` is unbounded
    pub max_concurrent_per_type: Option<usize>,

    /// Size of the blocking lane used for CPU-bound extraction
    pub max_concurrent_extractions: usize,

    /// Keep headings, list items and paragraph breaks in page text
    pub include_formatting: bool,

    /// User agent for web requests
    pub user_agent: String,

    /// Maximum redirects to follow
    pub max_redirects: usize,

    /// Maximum response body size in bytes
    pub max_body_bytes: usize,

    /// Preferred caption language for transcripts
    pub transcript_language: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extract_documents: true,
            extract_videos: false,
            prefer_html_over_pdf_for_arxiv: false,
            per_request_timeout_secs: 10,
            max_concurrent_per_type: Some(DEFAULT_MAX_CONCURRENT_PER_TYPE),
            max_concurrent_extractions: num_cpus::get() * 2,
            include_formatting: true,
            user_agent: format!(
                "HanzoParselite/{} (https://hanzo.ai)",
                env!("CARGO_PKG_VERSION")
            ),
            max_redirects: 5,
            max_body_bytes: 50 * 1024 * 1024,
            transcript_language: "en".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Enable or disable PDF extraction
    pub fn with_extract_documents(mut self, enabled: bool) -> Self {
        self.extract_documents = enabled;
        self
    }

    /// Enable or disable transcript extraction
    pub fn with_extract_videos(mut self, enabled: bool) -> Self {
        self.extract_videos = enabled;
        self
    }

    /// Choose the arxiv html rewrite target
    pub fn with_prefer_html_over_pdf_for_arxiv(mut self, prefer: bool) -> Self {
        self.prefer_html_over_pdf_for_arxiv = prefer;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.per_request_timeout_secs = timeout_secs;
        self
    }

    /// Cap in-flight tasks per content type (`None` restores unbounded fan-out)
    pub fn with_max_concurrent_per_type(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_per_type = limit;
        self
    }

    /// Size the extraction lane
    pub fn with_max_concurrent_extractions(mut self, limit: usize) -> Self {
        self.max_concurrent_extractions = limit;
        self
    }

    /// Enable or disable formatting-preserving page text
    pub fn with_include_formatting(mut self, include: bool) -> Self {
        self.include_formatting = include;
        self
    }

    /// Set the preferred transcript language
    pub fn with_transcript_language(mut self, language: impl Into<String>) -> Self {
        self.transcript_language = language.into();
        self
    }

    /// Per-request timeout as a duration
    pub fn per_request_timeout(&self) -> Duration {
        Duration::from_secs(self.per_request_timeout_secs)
    }

    /// Check the configuration for contract violations
    pub fn validate(&self) -> Result<()> {
        if self.per_request_timeout_secs == 0 {
            return Err(ResolveError::InvalidConfig(
                "per_request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_per_type == Some(0) {
            return Err(ResolveError::InvalidConfig(
                "max_concurrent_per_type must be greater than zero or unset".to_string(),
            ));
        }
        if self.max_concurrent_extractions == 0 {
            return Err(ResolveError::InvalidConfig(
                "max_concurrent_extractions must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ResolveError::InvalidConfig(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.transcript_language.trim().is_empty() {
            return Err(ResolveError::InvalidConfig(
                "transcript_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
