//! # Hanzo Parselite
//!
//! Resolves batches of URLs into extracted text.
//!
//! Each URL is classified as a web page, a PDF document or a video watch
//! page, deduplicated on its normalized form, and dispatched to the matching
//! extractor. Per-URL failures never fail the batch: every input gets exactly
//! one [`FetchOutcome`], in input order, carrying either text or a typed
//! [`ErrorKind`].
//!
//! ## Features
//!
//! - **Web pages**: main-content text via `scraper`, optionally keeping headings and lists
//! - **PDF documents**: page text via `lopdf` (feature `pdf`, on by default)
//! - **Video transcripts**: YouTube caption tracks (disabled unless `extract_videos`)
//! - **CLI**: `parselite` binary (feature `cli`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use hanzo_parselite::{Resolver, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::new(ResolverConfig::default())?;
//!     let batch = resolver
//!         .resolve_batch(&["https://example.com", "https://arxiv.org/abs/1706.03762"])
//!         .await?;
//!     for outcome in &batch {
//!         println!("{} -> {} ({} chars)", outcome.url, outcome.error_kind, outcome.content_len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌─────────────────────┐   ┌───────────┐
//! │ Raw URLs │──►│ Classifier │──►│ Dedupe   │──►│ Dispatcher          │──►│ Aggregate │
//! └──────────┘   │ (normalize)│   │ (by URL) │   │  html │ pdf │ video │   │ (input    │
//!                └────────────┘   └──────────┘   │  tasks, bounded     │   │  order)   │
//!                                                └─────────────────────┘   └───────────┘
//! ```

pub mod classify;
pub mod config;
pub mod dedupe;
pub mod dispatch;
pub mod error;
pub mod html;
pub mod outcome;
pub mod pdf;
pub mod resolver;
pub mod task;
pub mod transport;
pub mod video;

pub use classify::{classify, classify_all, is_skip_listed, media_id};
pub use config::ResolverConfig;
pub use error::{ExtractError, ResolveError, Result};
pub use html::{MarkupExtractor, ScraperExtractor};
pub use outcome::{ClassifiedUrl, ContentKind, ErrorKind, FetchOutcome, ResolvedBatch};
pub use pdf::DocumentExtractor;
pub use resolver::{parse, parse_one, Resolver, ResolverBuilder};
pub use task::Extractors;
pub use transport::{FetchedBody, HttpTransport, Session, Transport};
pub use video::{TranscriptExtractor, YoutubeTranscriptExtractor};

#[cfg(feature = "pdf")]
pub use pdf::LopdfExtractor;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::ResolverConfig;
    pub use crate::error::{ResolveError, Result};
    pub use crate::outcome::{ContentKind, ErrorKind, FetchOutcome, ResolvedBatch};
    pub use crate::resolver::Resolver;
}
