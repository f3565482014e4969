//! CLI for resolving URLs into text
//!
//! Usage:
//!   parselite https://example.com https://arxiv.org/abs/1706.03762 --json

use clap::Parser;
use hanzo_parselite::{ResolveError, Resolver, ResolverConfig};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "parselite", version, about = "Resolve URLs into extracted text")]
struct Args {
    /// URLs to resolve
    #[arg(required = true)]
    urls: Vec<String>,

    /// TOML config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not extract PDF documents
    #[arg(long)]
    no_documents: bool,

    /// Retrieve video transcripts
    #[arg(long)]
    videos: bool,

    /// Rewrite arxiv html links to the abstract page instead of the pdf
    #[arg(long)]
    arxiv_abstract: bool,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Maximum in-flight requests per content type
    #[arg(short = 'm', long, conflicts_with = "unbounded")]
    max_concurrent: Option<usize>,

    /// Launch every request at once
    #[arg(long)]
    unbounded: bool,

    /// Print outcomes as a JSON array
    #[arg(long)]
    json: bool,
}

impl Args {
    fn to_config(&self) -> hanzo_parselite::Result<ResolverConfig> {
        let mut config = match &self.config {
            Some(path) => ResolverConfig::load(path)?,
            None => ResolverConfig::default(),
        };

        if self.no_documents {
            config.extract_documents = false;
        }
        if self.videos {
            config.extract_videos = true;
        }
        if self.arxiv_abstract {
            config.prefer_html_over_pdf_for_arxiv = true;
        }
        if let Some(timeout) = self.timeout {
            config.per_request_timeout_secs = timeout;
        }
        if self.unbounded {
            config.max_concurrent_per_type = None;
        } else if let Some(limit) = self.max_concurrent {
            config.max_concurrent_per_type = Some(limit);
        }
        Ok(config)
    }
}

/// Completes when the signal fires. If the listener cannot be installed it
/// never completes, so the batch runs to the end instead of being cancelled.
async fn interrupted<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let resolver = match args.to_config().and_then(Resolver::new) {
        Ok(resolver) => resolver,
        Err(e @ ResolveError::InvalidConfig(_)) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    let shutdown = interrupted(tokio::signal::ctrl_c());
    let batch = match resolver.resolve_with_shutdown(&args.urls, shutdown).await {
        Ok(batch) => batch,
        Err(ResolveError::Cancelled) => {
            eprintln!("Interrupted");
            return Ok(ExitCode::from(130));
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        for outcome in &batch {
            println!(
                "{}\t{}\t{}",
                outcome.url,
                outcome.error_kind,
                outcome.content_len()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
