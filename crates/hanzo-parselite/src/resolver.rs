//! Batch resolution entry points

use crate::classify::classify_all;
use crate::config::ResolverConfig;
use crate::dedupe::dedupe;
use crate::dispatch::{aggregate, Dispatcher};
use crate::error::{ResolveError, Result};
use crate::html::{MarkupExtractor, ScraperExtractor};
use crate::outcome::{ErrorKind, FetchOutcome, ResolvedBatch};
use crate::pdf::DocumentExtractor;
use crate::task::Extractors;
use crate::transport::{HttpTransport, Transport};
use crate::video::{TranscriptExtractor, YoutubeTranscriptExtractor};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Resolves batches of URLs into extracted text
///
/// Holds configuration and collaborators only; every call builds its own
/// sessions and work queues and tears them down before returning.
pub struct Resolver {
    config: ResolverConfig,
    transport: Arc<dyn Transport>,
    extractors: Extractors,
}

impl Resolver {
    /// Create a resolver with the default HTTP transport and extractors
    pub fn new(config: ResolverConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a resolver with custom collaborators
    pub fn builder(config: ResolverConfig) -> ResolverBuilder {
        ResolverBuilder {
            config,
            transport: None,
            markup: None,
            document: None,
            transcript: None,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve every URL, returning one outcome per input in input order.
    ///
    /// Individual failures are reported per entry and never fail the call.
    pub async fn resolve_batch<S: AsRef<str>>(&self, urls: &[S]) -> Result<ResolvedBatch> {
        let started = Instant::now();
        let deduped = dedupe(classify_all(urls, &self.config));
        info!(
            inputs = urls.len(),
            distinct = deduped.entries.len(),
            "resolving batch"
        );

        let dispatcher = Dispatcher {
            config: &self.config,
            transport: Arc::clone(&self.transport),
            extractors: self.extractors.clone(),
        };
        let outcomes = dispatcher.dispatch(&deduped.entries).await;
        let batch = aggregate(urls, &deduped, &outcomes);

        info!(
            inputs = batch.len(),
            succeeded = batch.succeeded(),
            skipped = batch.count_kind(ErrorKind::Skipped),
            timed_out = batch.count_kind(ErrorKind::Timeout),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch resolved"
        );
        Ok(batch)
    }

    /// Resolve a single URL
    pub async fn resolve(&self, url: &str) -> Result<FetchOutcome> {
        let batch = self.resolve_batch(&[url]).await?;
        Ok(batch.into_iter().next().unwrap_or_else(|| {
            FetchOutcome::failure(url, ErrorKind::ExtractError, "no outcome produced")
        }))
    }

    /// Resolve a batch unless `shutdown` completes first.
    ///
    /// On shutdown all in-flight tasks are aborted and their sessions
    /// released before [`ResolveError::Cancelled`] is returned.
    pub async fn resolve_with_shutdown<S, F>(&self, urls: &[S], shutdown: F) -> Result<ResolvedBatch>
    where
        S: AsRef<str>,
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.resolve_batch(urls) => result,
            _ = shutdown => {
                info!(inputs = urls.len(), "batch cancelled");
                Err(ResolveError::Cancelled)
            }
        }
    }
}

/// Builder for [`Resolver`]
pub struct ResolverBuilder {
    config: ResolverConfig,
    transport: Option<Arc<dyn Transport>>,
    markup: Option<Arc<dyn MarkupExtractor>>,
    document: Option<Arc<dyn DocumentExtractor>>,
    transcript: Option<Arc<dyn TranscriptExtractor>>,
}

impl ResolverBuilder {
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_markup_extractor(mut self, extractor: Arc<dyn MarkupExtractor>) -> Self {
        self.markup = Some(extractor);
        self
    }

    pub fn with_document_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.document = Some(extractor);
        self
    }

    pub fn with_transcript_extractor(mut self, extractor: Arc<dyn TranscriptExtractor>) -> Self {
        self.transcript = Some(extractor);
        self
    }

    /// Validate the configuration and fill in default collaborators
    pub fn build(self) -> Result<Resolver> {
        self.config.validate()?;
        let config = self.config;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new(&config)));
        let markup = self
            .markup
            .unwrap_or_else(|| Arc::new(ScraperExtractor::new(config.include_formatting)));
        let document = self.document.unwrap_or_else(default_document_extractor);
        let transcript = self.transcript.unwrap_or_else(|| {
            Arc::new(YoutubeTranscriptExtractor::new(config.transcript_language.clone()))
        });

        Ok(Resolver {
            config,
            transport,
            extractors: Extractors {
                markup,
                document,
                transcript,
            },
        })
    }
}

#[cfg(feature = "pdf")]
fn default_document_extractor() -> Arc<dyn DocumentExtractor> {
    Arc::new(crate::pdf::LopdfExtractor::new())
}

#[cfg(not(feature = "pdf"))]
fn default_document_extractor() -> Arc<dyn DocumentExtractor> {
    Arc::new(crate::pdf::UnsupportedDocuments)
}

/// Resolve a batch with a fresh default resolver
pub async fn parse<S: AsRef<str>>(urls: &[S], config: ResolverConfig) -> Result<ResolvedBatch> {
    Resolver::new(config)?.resolve_batch(urls).await
}

/// Resolve one URL with a fresh default resolver
pub async fn parse_one(url: &str, config: ResolverConfig) -> Result<FetchOutcome> {
    Resolver::new(config)?.resolve(url).await
}
