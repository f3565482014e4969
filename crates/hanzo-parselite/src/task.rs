//! Per-URL fetch/extract task
//!
//! `Pending -> Fetching -> Extracting -> Done`, or `Pending -> Skipped -> Done`
//! when the HTML skip list matches. Every failure ends in a typed
//! [`FetchOutcome`]; nothing escapes to sibling tasks.

use crate::classify::{is_skip_listed, media_id};
use crate::error::ExtractError;
use crate::html::MarkupExtractor;
use crate::outcome::{ContentKind, ErrorKind, FetchOutcome};
use crate::pdf::DocumentExtractor;
use crate::transport::{get_ok, Session};
use crate::video::TranscriptExtractor;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

/// The pluggable extractor set
#[derive(Clone)]
pub struct Extractors {
    pub markup: Arc<dyn MarkupExtractor>,
    pub document: Arc<dyn DocumentExtractor>,
    pub transcript: Arc<dyn TranscriptExtractor>,
}

/// Shared state for every task in one partition
pub(crate) struct TaskContext {
    pub session: Arc<dyn Session>,
    pub extractors: Extractors,
    /// Blocking lane for CPU-bound extraction, shared across partitions
    pub cpu_lane: Arc<Semaphore>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Pending,
    Skipped,
    Fetching,
    Extracting,
    Done,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Pending => "pending",
            TaskState::Skipped => "skipped",
            TaskState::Fetching => "fetching",
            TaskState::Extracting => "extracting",
            TaskState::Done => "done",
        };
        f.write_str(name)
    }
}

struct Tracker<'a> {
    url: &'a str,
    kind: ContentKind,
    state: TaskState,
}

impl<'a> Tracker<'a> {
    fn new(url: &'a str, kind: ContentKind) -> Self {
        Self {
            url,
            kind,
            state: TaskState::Pending,
        }
    }

    fn advance(&mut self, next: TaskState) {
        trace!(url = self.url, kind = %self.kind, from = %self.state, to = %next, "task state");
        self.state = next;
    }
}

/// Resolve one normalized URL of the given kind
pub(crate) async fn run(ctx: Arc<TaskContext>, kind: ContentKind, url: String) -> FetchOutcome {
    let mut tracker = Tracker::new(&url, kind);

    if kind == ContentKind::Html && is_skip_listed(&url) {
        tracker.advance(TaskState::Skipped);
        tracker.advance(TaskState::Done);
        debug!(url = %url, "skip-listed for html extraction");
        return FetchOutcome::skipped(url.as_str(), "url is skip-listed for html extraction");
    }

    let deadline = ctx.timeout;
    let result = tokio::time::timeout(deadline, fetch_and_extract(&ctx, kind, &url, &mut tracker)).await;
    tracker.advance(TaskState::Done);

    let outcome = match result {
        Ok(Ok(text)) => FetchOutcome::success(url.as_str(), text),
        Ok(Err(e)) => FetchOutcome::failure(url.as_str(), e.kind(), e.to_string()),
        Err(_) => FetchOutcome::failure(
            url.as_str(),
            ErrorKind::Timeout,
            ExtractError::Timeout(deadline.as_millis() as u64).to_string(),
        ),
    };

    if outcome.ok {
        debug!(url = %url, kind = %kind, chars = outcome.content_len(), "resolved");
    } else {
        warn!(
            url = %url,
            kind = %kind,
            error_kind = %outcome.error_kind,
            message = outcome.message.as_deref().unwrap_or_default(),
            "resolution failed"
        );
    }
    outcome
}

async fn fetch_and_extract(
    ctx: &TaskContext,
    kind: ContentKind,
    url: &str,
    tracker: &mut Tracker<'_>,
) -> Result<String, ExtractError> {
    let text = match kind {
        ContentKind::Html => {
            tracker.advance(TaskState::Fetching);
            let body = get_ok(&*ctx.session, url, ctx.timeout).await?;
            tracker.advance(TaskState::Extracting);
            let markup = Arc::clone(&ctx.extractors.markup);
            run_blocking(&ctx.cpu_lane, move || markup.extract_text(&body.bytes)).await?
        }
        ContentKind::Pdf => {
            tracker.advance(TaskState::Fetching);
            let body = get_ok(&*ctx.session, url, ctx.timeout).await?;
            tracker.advance(TaskState::Extracting);
            let document = Arc::clone(&ctx.extractors.document);
            run_blocking(&ctx.cpu_lane, move || document.extract_text(&body.bytes)).await?
        }
        ContentKind::Video => {
            let id = media_id(url)
                .ok_or_else(|| ExtractError::Parse(format!("no media id in {}", url)))?;
            tracker.advance(TaskState::Extracting);
            ctx.extractors
                .transcript
                .extract_transcript(&*ctx.session, &id, ctx.timeout)
                .await?
        }
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Run CPU-bound work off the async workers, bounded by `lane`
async fn run_blocking<F>(lane: &Arc<Semaphore>, work: F) -> Result<String, ExtractError>
where
    F: FnOnce() -> Result<String, ExtractError> + Send + 'static,
{
    let permit = Arc::clone(lane)
        .acquire_owned()
        .await
        .map_err(|_| ExtractError::Other("extraction lane closed".to_string()))?;

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
    .await?
}
