//! S3: raw markup scan for highlight file URLs.
//!
//! Last resort when neither the feed nor the embedded data mention the
//! video. Matches the CDN's host/path convention and `.mp4` extension.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use super::{bounded, contains_ignore_case, settle, Strategy, StrategyError};
use crate::adapters::Fetcher;
use crate::config::{event_url, AppConfig};
use crate::domain::{Candidate, StrategyKind};

fn video_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"https://mlb-cuts-diamond\.mlb\.com/[^\s"'<>\\]+?\.mp4"#)
            .expect("video url pattern is valid")
    })
}

/// Title from the file name: `condensed-game-sf-lad.mp4` → `condensed game sf lad`
fn title_from_url(url: &str) -> String {
    let file = url.rsplit('/').next().unwrap_or(url);
    let stem = file.strip_suffix(".mp4").unwrap_or(file);
    let title = stem.replace(['-', '_'], " ");
    let title = title.trim();

    if title.is_empty() {
        "Condensed Game".to_string()
    } else {
        title.to_string()
    }
}

/// Regex scan of page markup for CDN video links
pub struct MarkupScanStrategy {
    fetcher: Arc<dyn Fetcher>,
    url_template: String,
    keyword: String,
    max_page_bytes: usize,
}

impl MarkupScanStrategy {
    pub fn new(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            url_template: config.endpoints.markup_page_url.clone(),
            keyword: config.keyword.clone(),
            max_page_bytes: config.max_page_bytes,
        }
    }

    fn extract(&self, page: &str) -> Option<Candidate> {
        // Inline JSON escapes slashes
        let page = bounded(page, self.max_page_bytes).replace("\\/", "/");

        video_url_pattern()
            .find_iter(&page)
            .map(|m| m.as_str())
            .find(|url| contains_ignore_case(url, &self.keyword))
            .map(|url| Candidate::new(title_from_url(url), url, StrategyKind::MarkupScan))
    }

    async fn lookup(&self, event_id: &str) -> Result<Option<Candidate>, StrategyError> {
        let url = event_url(&self.url_template, event_id);
        let page = self.fetcher.get_text(&url).await?;
        Ok(self.extract(&page))
    }
}

#[async_trait]
impl Strategy for MarkupScanStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MarkupScan
    }

    async fn attempt(&self, event_id: &str) -> Option<Candidate> {
        settle(self.kind(), event_id, self.lookup(event_id).await)
    }
}
