//! Adapter interfaces for external systems.
//!
//! Adapters give the core a narrow view of the outside world:
//! - `Fetcher`: blocking-style GET of upstream text with a timeout
//! - `Notifier`: delivery of one announcement
//! - `LogSync`: moving the dedup log to/from remote storage

pub mod http;
pub mod sync;
pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the concrete adapters
pub use http::HttpFetcher;
pub use sync::{LogSync, MirrorSync, NoopSync};
pub use telegram::{format_announcement, DryRunNotifier, TelegramClient, TelegramConfig, TelegramNotifier};

/// Transient failures talking to an upstream
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Read-only access to upstream feeds and pages
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body as text.
    ///
    /// Non-success statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Delivers one formatted announcement to an external channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable notifier name
    fn name(&self) -> &str;

    /// Deliver the announcement for `title` / `url`.
    ///
    /// Never fails loudly: returns `false` on any delivery problem.
    async fn send(&self, title: &str, url: &str) -> bool;
}
