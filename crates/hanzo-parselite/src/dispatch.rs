//! Type-partitioned dispatch and result aggregation

use crate::config::ResolverConfig;
use crate::dedupe::Deduplicated;
use crate::outcome::{ClassifiedUrl, ContentKind, ErrorKind, FetchOutcome, ResolvedBatch};
use crate::task::{self, Extractors, TaskContext};
use crate::transport::Transport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Normalized URLs of one kind, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub kind: ContentKind,
    pub urls: Vec<String>,
}

/// Split deduplicated entries into one ordered group per kind
pub fn partition(entries: &[ClassifiedUrl]) -> [Partition; 3] {
    let mut groups = ContentKind::ALL.map(|kind| Partition {
        kind,
        urls: Vec::new(),
    });
    for entry in entries {
        let slot = match entry.kind {
            ContentKind::Html => 0,
            ContentKind::Pdf => 1,
            ContentKind::Video => 2,
        };
        groups[slot].urls.push(entry.normalized_url.clone());
    }
    groups
}

/// Fans partitions out to per-URL tasks
pub(crate) struct Dispatcher<'a> {
    pub config: &'a ResolverConfig,
    pub transport: Arc<dyn Transport>,
    pub extractors: Extractors,
}

impl Dispatcher<'_> {
    fn enabled(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Html => true,
            ContentKind::Pdf => self.config.extract_documents,
            ContentKind::Video => self.config.extract_videos,
        }
    }

    /// Run every enabled, non-empty partition concurrently.
    ///
    /// Returns one outcome per dispatched normalized URL. URLs of a disabled
    /// kind are absent from the map.
    pub async fn dispatch(&self, entries: &[ClassifiedUrl]) -> HashMap<String, FetchOutcome> {
        // Shared by all partitions, sized independently of network concurrency
        let cpu_lane = Arc::new(Semaphore::new(self.config.max_concurrent_extractions));
        let [html, pdf, video] = partition(entries);

        let (html, pdf, video) = tokio::join!(
            self.run_partition(ContentKind::Html, html.urls, &cpu_lane),
            self.run_partition(ContentKind::Pdf, pdf.urls, &cpu_lane),
            self.run_partition(ContentKind::Video, video.urls, &cpu_lane),
        );

        html.into_iter().chain(pdf).chain(video).collect()
    }

    async fn run_partition(
        &self,
        kind: ContentKind,
        urls: Vec<String>,
        cpu_lane: &Arc<Semaphore>,
    ) -> Vec<(String, FetchOutcome)> {
        if urls.is_empty() {
            return Vec::new();
        }
        if !self.enabled(kind) {
            debug!(kind = %kind, count = urls.len(), "kind disabled, not dispatching");
            return Vec::new();
        }

        let session = match self.transport.open_session() {
            Ok(session) => session,
            Err(e) => {
                warn!(kind = %kind, error = %e, "could not open session");
                let message = e.to_string();
                return urls
                    .into_iter()
                    .map(|url| {
                        let outcome =
                            FetchOutcome::failure(url.as_str(), ErrorKind::TransportError, message.clone());
                        (url, outcome)
                    })
                    .collect();
            }
        };

        let ctx = Arc::new(TaskContext {
            session,
            extractors: self.extractors.clone(),
            cpu_lane: Arc::clone(cpu_lane),
            timeout: self.config.per_request_timeout(),
        });
        let limiter = self
            .config
            .max_concurrent_per_type
            .map(|limit| Arc::new(Semaphore::new(limit)));

        debug!(kind = %kind, count = urls.len(), limit = ?self.config.max_concurrent_per_type, "dispatching partition");

        let mut tasks = JoinSet::new();
        for (slot, url) in urls.iter().enumerate() {
            let ctx = Arc::clone(&ctx);
            let limiter = limiter.clone();
            let url = url.clone();
            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                (slot, task::run(ctx, kind, url).await)
            });
        }

        let mut results: Vec<Option<FetchOutcome>> = vec![None; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => results[slot] = Some(outcome),
                Err(e) => warn!(kind = %kind, error = %e, "task did not complete"),
            }
        }
        drop(ctx);

        urls.into_iter()
            .zip(results)
            .map(|(url, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    FetchOutcome::failure(url.as_str(), ErrorKind::ExtractError, "task did not complete")
                });
                (url, outcome)
            })
            .collect()
    }
}

/// Rebuild input order from per-URL outcomes.
///
/// Every input index gets a copy of its normalized URL's outcome,
/// re-attributed to the raw URL the caller supplied. Normalized URLs that
/// were never dispatched become `Skipped`.
pub fn aggregate<S: AsRef<str>>(
    raw_urls: &[S],
    deduped: &Deduplicated,
    outcomes: &HashMap<String, FetchOutcome>,
) -> ResolvedBatch {
    let kinds: HashMap<&str, ContentKind> = deduped
        .entries
        .iter()
        .map(|e| (e.normalized_url.as_str(), e.kind))
        .collect();
    let normalized = deduped.normalized_by_index();

    let batch = raw_urls
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.as_ref();
            let Some(url) = normalized.get(index).copied().flatten() else {
                return FetchOutcome::skipped(raw, "url was not classified");
            };
            match outcomes.get(url) {
                Some(outcome) => outcome.for_input(raw),
                None => {
                    let reason = match kinds.get(url) {
                        Some(kind) => format!("{} extraction disabled", kind),
                        None => "url was not dispatched".to_string(),
                    };
                    FetchOutcome {
                        resolved_url: url.to_string(),
                        ..FetchOutcome::skipped(raw, reason)
                    }
                }
            }
        })
        .collect();

    ResolvedBatch::new(batch)
}
