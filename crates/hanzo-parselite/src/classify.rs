//! URL classification, normalization and the HTML skip list
//!
//! Rules apply in priority order:
//!
//! 1. arxiv abstract links become pdf links when documents are extracted
//! 2. arxiv html links become abstract or pdf links depending on
//!    `prefer_html_over_pdf_for_arxiv`
//! 3. a `pdf` path segment or `.pdf` suffix classifies as [`ContentKind::Pdf`]
//! 4. a video-hosting watch page classifies as [`ContentKind::Video`]
//! 5. everything else is [`ContentKind::Html`]

use crate::config::ResolverConfig;
use crate::outcome::{ClassifiedUrl, ContentKind};
use url::Url;

const ARXIV_ABS: &str = "https://arxiv.org/abs/";
const ARXIV_PDF: &str = "https://arxiv.org/pdf/";
const ARXIV_HTML: [&str; 2] = ["http://arxiv.org/html/", "https://arxiv.org/html/"];

const YOUTUBE_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];
const YOUTUBE_SHORT_HOST: &str = "youtu.be";

/// Classify and normalize a raw URL. Never fails; unknown shapes are HTML.
pub fn classify(raw_url: &str, original_index: usize, config: &ResolverConfig) -> ClassifiedUrl {
    let normalized_url = rewrite_arxiv(raw_url.trim(), config);
    let kind = if is_pdf_url(&normalized_url) {
        ContentKind::Pdf
    } else if is_video_url(&normalized_url) {
        ContentKind::Video
    } else {
        ContentKind::Html
    };

    ClassifiedUrl {
        normalized_url,
        kind,
        original_index,
    }
}

/// Classify a whole batch, keeping input positions
pub fn classify_all<S: AsRef<str>>(raw_urls: &[S], config: &ResolverConfig) -> Vec<ClassifiedUrl> {
    raw_urls
        .iter()
        .enumerate()
        .map(|(index, raw)| classify(raw.as_ref(), index, config))
        .collect()
}

fn rewrite_arxiv(url: &str, config: &ResolverConfig) -> String {
    if url.contains(ARXIV_ABS) {
        if config.extract_documents {
            return url.replacen(ARXIV_ABS, ARXIV_PDF, 1);
        }
        return url.to_string();
    }

    for prefix in ARXIV_HTML {
        if url.contains(prefix) {
            let target = if config.prefer_html_over_pdf_for_arxiv {
                ARXIV_ABS
            } else {
                ARXIV_PDF
            };
            return url.replacen(prefix, target, 1);
        }
    }

    url.to_string()
}

fn is_pdf_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().to_ascii_lowercase();
            path.ends_with(".pdf") || path.split('/').any(|segment| segment == "pdf")
        }
        Err(_) => {
            let lower = url.to_ascii_lowercase();
            lower.ends_with(".pdf") || lower.contains("/pdf/")
        }
    }
}

fn is_video_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_ascii_lowercase().contains("youtube.com/watch");
    };
    let Some(host) = parsed.host_str().map(|h| h.to_ascii_lowercase()) else {
        return false;
    };

    if host == YOUTUBE_SHORT_HOST {
        return parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .is_some_and(|id| !id.is_empty());
    }

    if YOUTUBE_HOSTS.contains(&host.as_str()) {
        let path = parsed.path();
        return path == "/watch"
            || path.starts_with("/watch/")
            || path.starts_with("/shorts/")
            || path.starts_with("/embed/")
            || path.starts_with("/live/");
    }

    false
}

/// Whether the HTML path must not attempt this URL.
///
/// Covers pdf mirrors, direct `.pdf` links and video watch pages that reach
/// the HTML extractor with the wrong kind.
pub fn is_skip_listed(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains("https://arxiv.org/pdf") || lower.ends_with(".pdf") || lower.contains("youtube.com/watch")
}

/// Derive the media identifier naming a video
pub fn media_id(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "v") {
            if !id.is_empty() {
                return Some(id.into_owned());
            }
        }

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        if host == YOUTUBE_SHORT_HOST {
            return segments.first().map(|id| id.to_string());
        }

        if let [prefix, id, ..] = segments.as_slice() {
            if matches!(*prefix, "shorts" | "embed" | "live") {
                return Some(id.to_string());
            }
        }
    }

    url.split_once("?v=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or(rest).to_string())
        .filter(|id| !id.is_empty())
}
