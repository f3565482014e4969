//! Network transport
//!
//! A [`Transport`] hands out [`Session`]s. The dispatcher opens one session per
//! non-empty partition and drops it when the partition finishes, is cancelled
//! or fails, so no connection pool outlives the batch call that created it.

use crate::config::ResolverConfig;
use crate::error::{ExtractError, ResolveError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Raw response from a fetch
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// A scoped network session
#[async_trait]
pub trait Session: Send + Sync {
    /// GET a URL. Non-2xx statuses are returned, not raised.
    async fn get(&self, url: &str, timeout: Duration) -> std::result::Result<FetchedBody, ExtractError>;
}

/// Factory for sessions
pub trait Transport: Send + Sync {
    fn open_session(&self) -> Result<Arc<dyn Session>>;
}

/// Fetch and require a 2xx status
pub(crate) async fn get_ok(
    session: &dyn Session,
    url: &str,
    timeout: Duration,
) -> std::result::Result<FetchedBody, ExtractError> {
    let body = session.get(url, timeout).await?;
    if !body.is_success() {
        return Err(ExtractError::Http {
            status: body.status,
            message: format!("unexpected status fetching {}", url),
        });
    }
    Ok(body)
}

/// Transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    user_agent: String,
    max_redirects: usize,
    max_body_bytes: usize,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl HttpTransport {
    /// Create a transport from the resolver configuration
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Transport for HttpTransport {
    fn open_session(&self) -> Result<Arc<dyn Session>> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        debug!("http session opened");
        Ok(Arc::new(HttpSession {
            client,
            max_body_bytes: self.max_body_bytes,
        }))
    }
}

struct HttpSession {
    client: Client,
    max_body_bytes: usize,
}

#[async_trait]
impl Session for HttpSession {
    async fn get(&self, url: &str, timeout: Duration) -> std::result::Result<FetchedBody, ExtractError> {
        let url = url::Url::parse(url)?;
        let timeout_ms = timeout.as_millis() as u64;

        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(e, timeout_ms))?;

        let status = response.status().as_u16();
        if let Some(length) = response.content_length() {
            if length as usize > self.max_body_bytes {
                return Err(ExtractError::ContentTooLarge {
                    size: length as usize,
                    max: self.max_body_bytes,
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Chunked bodies carry no length up front; stop as soon as the cap is passed
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ExtractError::from_reqwest(e, timeout_ms))?
        {
            let size = bytes.len() + chunk.len();
            if size > self.max_body_bytes {
                return Err(ExtractError::ContentTooLarge {
                    size,
                    max: self.max_body_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedBody {
            status,
            content_type,
            bytes,
        })
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        debug!("http session released");
    }
}
