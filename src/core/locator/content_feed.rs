//! S1: structured lookup against the game content feed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{settle, MediaItem, Strategy, StrategyError, is_absolute};
use crate::adapters::Fetcher;
use crate::config::{event_url, AppConfig};
use crate::domain::{Candidate, StrategyKind};

/// Relative item URLs are paths on the public site
const SITE_BASE: &str = "https://www.mlb.com";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentResponse {
    highlights: HighlightsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HighlightsSection {
    highlights: HighlightList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HighlightList {
    items: Vec<MediaItem>,
}

/// Scans the content feed's highlight items for the keyword
pub struct ContentFeedStrategy {
    fetcher: Arc<dyn Fetcher>,
    url_template: String,
    keyword: String,
    playback_format: String,
}

impl ContentFeedStrategy {
    pub fn new(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            url_template: config.endpoints.content_url.clone(),
            keyword: config.keyword.clone(),
            playback_format: config.playback_format.clone(),
        }
    }

    /// Pick the candidate out of a content feed body
    fn extract(&self, body: &str) -> Result<Option<Candidate>, StrategyError> {
        let content: ContentResponse =
            serde_json::from_str(body).map_err(|e| StrategyError::Parse(e.to_string()))?;

        for item in content.highlights.highlights.items {
            if !item.mentions(&self.keyword) {
                continue;
            }

            let url = match item.canonical_playback(&self.playback_format) {
                Some(url) => url.to_string(),
                None => match item.url.as_deref().map(str::trim) {
                    Some(u) if is_absolute(u) => u.to_string(),
                    Some(u) if !u.is_empty() => format!("{}{}", SITE_BASE, u),
                    _ => continue,
                },
            };

            let title = item.title_or("Condensed Game").to_string();
            return Ok(Some(Candidate::new(title, url, StrategyKind::ContentFeed)));
        }

        Ok(None)
    }

    async fn lookup(&self, event_id: &str) -> Result<Option<Candidate>, StrategyError> {
        let url = event_url(&self.url_template, event_id);
        let body = self.fetcher.get_text(&url).await?;
        self.extract(&body)
    }
}

#[async_trait]
impl Strategy for ContentFeedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ContentFeed
    }

    async fn attempt(&self, event_id: &str) -> Option<Candidate> {
        settle(self.kind(), event_id, self.lookup(event_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::MockFetcher;

    const FEED_URL: &str = "https://statsapi.mlb.com/api/v1/game/777/content";

    fn strategy(fetcher: MockFetcher) -> ContentFeedStrategy {
        ContentFeedStrategy::new(&AppConfig::default(), Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_prefers_mp4_playback() {
        let body = r#"{"highlights": {"highlights": {"items": [
            {"title": "Top plays", "playbacks": [{"name": "mp4Avc", "url": "https://x.test/top.mp4"}]},
            {"title": "Condensed Game: SF@LAD", "url": "/video/condensed-sf-lad",
             "playbacks": [
                {"name": "hlsCloud", "url": "https://x.test/c.m3u8"},
                {"name": "mp4Avc", "url": "https://x.test/c.mp4"}
             ]}
        ]}}}"#;
        let s = strategy(MockFetcher::new().with(FEED_URL, body));

        let candidate = s.attempt("777").await.unwrap();
        assert_eq!(candidate.title, "Condensed Game: SF@LAD");
        assert_eq!(candidate.url, "https://x.test/c.mp4");
        assert_eq!(candidate.strategy, StrategyKind::ContentFeed);
    }

    #[tokio::test]
    async fn test_description_match_falls_back_to_site_url() {
        let body = r#"{"highlights": {"highlights": {"items": [
            {"title": "SF@LAD recap", "description": "Condensed game", "url": "/video/sf-lad"}
        ]}}}"#;
        let s = strategy(MockFetcher::new().with(FEED_URL, body));

        let candidate = s.attempt("777").await.unwrap();
        assert_eq!(candidate.url, "https://www.mlb.com/video/sf-lad");
    }

    #[tokio::test]
    async fn test_no_keyword_is_miss() {
        let body = r#"{"highlights": {"highlights": {"items": [
            {"title": "Home run", "url": "/video/hr"}
        ]}}}"#;
        let s = strategy(MockFetcher::new().with(FEED_URL, body));

        assert!(s.attempt("777").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_sections_is_miss() {
        let s = strategy(MockFetcher::new().with(FEED_URL, r#"{"editorial": {}}"#));
        assert!(s.attempt("777").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_and_unreachable_are_misses() {
        let s = strategy(MockFetcher::new().with(FEED_URL, "{not json"));
        assert!(s.attempt("777").await.is_none());

        let s = strategy(MockFetcher::new());
        assert!(s.attempt("777").await.is_none());
    }
}
