//! Video transcript retrieval

use crate::error::ExtractError;
use crate::transport::{get_ok, Session};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;

/// Retrieves a formatted transcript for a media identifier
#[async_trait]
pub trait TranscriptExtractor: Send + Sync {
    /// Fetch the transcript for `media_id`, using `session` for any network I/O
    async fn extract_transcript(
        &self,
        session: &dyn Session,
        media_id: &str,
        timeout: Duration,
    ) -> Result<String, ExtractError>;
}

static CAPTION_TRACKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""captionTracks"\s*:\s*(\[.*?\])\s*,\s*""#).expect("caption track pattern is valid")
});

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    /// `"asr"` for auto-generated tracks
    #[serde(default)]
    kind: Option<String>,
}

/// [`TranscriptExtractor`] for YouTube
///
/// Reads the caption track list embedded in the watch page, picks the
/// preferred language (manual tracks before auto-generated ones) and
/// renders the timed-text document one caption per line.
#[derive(Debug, Clone)]
pub struct YoutubeTranscriptExtractor {
    language: String,
    watch_base: String,
}

impl Default for YoutubeTranscriptExtractor {
    fn default() -> Self {
        Self::new("en")
    }
}

impl YoutubeTranscriptExtractor {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            watch_base: "https://www.youtube.com/watch?v=".to_string(),
        }
    }

    /// Override the watch page prefix the media id is appended to
    pub fn with_watch_base(mut self, watch_base: impl Into<String>) -> Self {
        self.watch_base = watch_base.into();
        self
    }

    fn select_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        let is_manual = |t: &&CaptionTrack| t.kind.as_deref() != Some("asr");
        let wants = |t: &&CaptionTrack| t.language_code == self.language;

        tracks
            .iter()
            .filter(wants)
            .find(is_manual)
            .or_else(|| tracks.iter().find(wants))
            .or_else(|| tracks.iter().find(is_manual))
            .or_else(|| tracks.first())
    }
}

#[async_trait]
impl TranscriptExtractor for YoutubeTranscriptExtractor {
    async fn extract_transcript(
        &self,
        session: &dyn Session,
        media_id: &str,
        timeout: Duration,
    ) -> Result<String, ExtractError> {
        let watch_url = format!("{}{}", self.watch_base, media_id);
        let page = get_ok(session, &watch_url, timeout).await?.text();

        let tracks = parse_caption_tracks(&page)?;
        let track = self
            .select_track(&tracks)
            .ok_or_else(|| ExtractError::Transcript(format!("no captions for {}", media_id)))?;

        let timed_text = get_ok(session, &track.base_url, timeout).await?.text();
        let lines = parse_timed_text(&timed_text);
        if lines.is_empty() {
            return Err(ExtractError::Transcript(format!(
                "empty caption track for {}",
                media_id
            )));
        }
        Ok(lines.join("\n"))
    }
}

fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, ExtractError> {
    let captures = CAPTION_TRACKS
        .captures(page)
        .ok_or_else(|| ExtractError::Transcript("transcripts are disabled for this video".to_string()))?;
    let tracks: Vec<CaptionTrack> = serde_json::from_str(&captures[1])?;
    Ok(tracks)
}

/// Caption lines from a timed-text document, entities decoded
fn parse_timed_text(xml: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("text") else {
        return Vec::new();
    };
    let document = Html::parse_fragment(xml);

    document
        .select(&selector)
        .map(|node| decode_entities(&node.text().collect::<String>()))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Timed text is often escaped twice (`&amp;#39;`); decode the second layer
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FetchedBody;
    use std::collections::HashMap;

    const WATCH_PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","languageCode":"de"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en"}],"audioTracks":[]}}};</script></html>"#;

    const TIMED_TEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.2">Hello &amp;amp; welcome</text><text start="1.7" dur="2.0">it&amp;#39;s a   test</text><text start="3.7" dur="1.0"> </text></transcript>"#;

    struct StaticSession {
        pages: HashMap<String, FetchedBody>,
    }

    #[async_trait]
    impl Session for StaticSession {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchedBody, ExtractError> {
            Ok(self.pages.get(url).cloned().unwrap_or(FetchedBody {
                status: 404,
                content_type: None,
                bytes: Vec::new(),
            }))
        }
    }

    fn body(text: &str) -> FetchedBody {
        FetchedBody {
            status: 200,
            content_type: Some("text/html".into()),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_parse_caption_tracks() {
        let tracks = parse_caption_tracks(WATCH_PAGE).unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(
            tracks[2].base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=en"
        );
        assert_eq!(tracks[1].kind.as_deref(), Some("asr"));
    }

    #[test]
    fn test_select_track_prefers_manual_in_language() {
        let tracks = parse_caption_tracks(WATCH_PAGE).unwrap();
        let english = YoutubeTranscriptExtractor::new("en");
        assert_eq!(
            english.select_track(&tracks).unwrap().base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=en"
        );

        let french = YoutubeTranscriptExtractor::new("fr");
        assert_eq!(french.select_track(&tracks).unwrap().language_code, "de");
    }

    #[test]
    fn test_parse_timed_text() {
        assert_eq!(
            parse_timed_text(TIMED_TEXT),
            vec!["Hello & welcome".to_string(), "it's a test".to_string()]
        );
    }

    #[test]
    fn test_missing_captions() {
        let result = parse_caption_tracks("<html>no player here</html>");
        assert!(matches!(result, Err(ExtractError::Transcript(_))));
    }

    #[tokio::test]
    async fn test_extract_transcript() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://www.youtube.com/watch?v=abc".to_string(),
            body(WATCH_PAGE),
        );
        pages.insert(
            "https://www.youtube.com/api/timedtext?v=abc&lang=en".to_string(),
            body(TIMED_TEXT),
        );
        let session = StaticSession { pages };

        let transcript = YoutubeTranscriptExtractor::default()
            .extract_transcript(&session, "abc", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(transcript, "Hello & welcome\nit's a test");
    }

    #[tokio::test]
    async fn test_watch_page_failure_is_http_error() {
        let session = StaticSession {
            pages: HashMap::new(),
        };
        let err = YoutubeTranscriptExtractor::default()
            .extract_transcript(&session, "gone", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Http { status: 404, .. }));
    }
}
