//! reqwest-backed `Fetcher`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{FetchError, Fetcher};

const USER_AGENT: &str = concat!("condensed-bot/", env!("CARGO_PKG_VERSION"));

/// HTTP fetcher with a fixed per-request timeout and body cap
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Create a fetcher whose every request is bounded by `timeout`, and
    /// which reads at most `max_body_bytes` of any response body
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

fn body_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Body(e.to_string())
    }
}

/// Append `chunk` to `body` without growing past `cap`.
///
/// Returns true once the cap is reached.
fn push_capped(body: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(body.len());
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    body.len() >= cap
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "GET");

        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| body_error(url, e))? {
            if push_capped(&mut body, &chunk, self.max_body_bytes) {
                warn!(%url, cap = self.max_body_bytes, "Response body truncated");
                break;
            }
        }

        // A char split by the cap decodes as U+FFFD
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
