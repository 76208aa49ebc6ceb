//! Highlight video locator.
//!
//! Tries an ordered chain of extraction strategies and stops at the first
//! hit. Upstream feeds and pages change shape without notice, so every
//! strategy swallows its own fetch and parse failures and reports a miss.

pub mod content_feed;
pub mod embedded_data;
pub mod markup_scan;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::adapters::{FetchError, Fetcher};
use crate::config::AppConfig;
use crate::domain::{Candidate, StrategyKind};

pub use content_feed::ContentFeedStrategy;
pub use embedded_data::EmbeddedDataStrategy;
pub use markup_scan::MarkupScanStrategy;

/// Why a strategy came back empty-handed
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected upstream shape: {0}")]
    Parse(String),
}

/// One independent technique for resolving a video URL
#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Look for the video of `event_id`. Never fails; misses are `None`.
    async fn attempt(&self, event_id: &str) -> Option<Candidate>;
}

/// Turn a strategy's internal result into a logged hit or miss
pub(crate) fn settle(
    kind: StrategyKind,
    event_id: &str,
    result: Result<Option<Candidate>, StrategyError>,
) -> Option<Candidate> {
    match result {
        Ok(Some(candidate)) => Some(candidate),
        Ok(None) => {
            debug!(%event_id, strategy = %kind, "No matching video");
            None
        }
        Err(StrategyError::Fetch(e)) => {
            warn!(%event_id, strategy = %kind, error = %e, "Upstream fetch failed");
            None
        }
        Err(StrategyError::Parse(e)) => {
            warn!(%event_id, strategy = %kind, error = %e, "Upstream layout not understood");
            None
        }
    }
}

/// Ordered strategy chain, first match wins
pub struct VideoLocator {
    strategies: Vec<Box<dyn Strategy>>,
}

impl VideoLocator {
    /// Build a locator from strategies in priority order
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain: content feed, embedded page data, raw markup scan
    pub fn from_config(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(vec![
            Box::new(ContentFeedStrategy::new(config, fetcher.clone())),
            Box::new(EmbeddedDataStrategy::new(config, fetcher.clone())),
            Box::new(MarkupScanStrategy::new(config, fetcher)),
        ])
    }

    /// Strategy kinds in the order they are tried
    pub fn order(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Resolve a video for `event_id`, or `None` if no strategy finds one
    pub async fn resolve(&self, event_id: &str) -> Option<Candidate> {
        for strategy in &self.strategies {
            if let Some(candidate) = strategy.attempt(event_id).await {
                info!(
                    %event_id,
                    strategy = %candidate.strategy,
                    url = %candidate.url,
                    "Video located"
                );
                return Some(candidate);
            }
        }

        info!(%event_id, "No strategy located a video");
        None
    }
}

/// Media entry shape shared by the content feed and embedded page data
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MediaItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "playbackUrl")]
    pub playback_url: Option<String>,
    pub playbacks: Vec<Playback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Playback {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl MediaItem {
    /// Title or description contains `keyword`, ignoring case
    pub fn mentions(&self, keyword: &str) -> bool {
        [&self.title, &self.description]
            .into_iter()
            .flatten()
            .any(|text| contains_ignore_case(text, keyword))
    }

    /// URL of the first playback whose name names the canonical `format`
    pub fn canonical_playback(&self, format: &str) -> Option<&str> {
        self.playbacks
            .iter()
            .filter(|p| {
                p.name
                    .as_deref()
                    .is_some_and(|name| contains_ignore_case(name, format))
            })
            .find_map(|p| non_empty(p.url.as_deref()))
    }

    /// Canonical playback, else any absolute playback URL
    pub fn any_playback(&self, format: &str) -> Option<&str> {
        self.canonical_playback(format)
            .or_else(|| {
                self.playbacks
                    .iter()
                    .find_map(|p| non_empty(p.url.as_deref()).filter(|u| is_absolute(u)))
            })
            .or_else(|| non_empty(self.playback_url.as_deref()).filter(|u| is_absolute(u)))
            .or_else(|| non_empty(self.url.as_deref()).filter(|u| is_absolute(u)))
    }

    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.title.as_deref()).unwrap_or(fallback)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn is_absolute(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Cap `page` at `max_bytes`, backing off to a char boundary
pub(crate) fn bounded(page: &str, max_bytes: usize) -> &str {
    if page.len() <= max_bytes {
        return page;
    }

    let mut end = max_bytes;
    while !page.is_char_boundary(end) {
        end -= 1;
    }
    &page[..end]
}
