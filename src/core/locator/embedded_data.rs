//! S2: JSON blob embedded in the rendered game page.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use super::{bounded, contains_ignore_case, settle, MediaItem, Strategy, StrategyError};
use crate::adapters::Fetcher;
use crate::config::{event_url, AppConfig};
use crate::domain::{Candidate, StrategyKind};

fn data_blob_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<script[^>]*\bid\s*=\s*["']__NEXT_DATA__["'][^>]*>(.*?)</script>"#)
            .expect("embedded data pattern is valid")
    })
}

/// Extracts the page's embedded state and walks it for the video
pub struct EmbeddedDataStrategy {
    fetcher: Arc<dyn Fetcher>,
    url_template: String,
    keyword: String,
    playback_format: String,
    max_page_bytes: usize,
}

impl EmbeddedDataStrategy {
    pub fn new(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            url_template: config.endpoints.embedded_page_url.clone(),
            keyword: config.keyword.clone(),
            playback_format: config.playback_format.clone(),
            max_page_bytes: config.max_page_bytes,
        }
    }

    fn extract(&self, page: &str) -> Result<Option<Candidate>, StrategyError> {
        let page = bounded(page, self.max_page_bytes);

        let blob = data_blob_pattern()
            .captures(page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .ok_or_else(|| StrategyError::Parse("no embedded data blob".to_string()))?;

        let data: Value =
            serde_json::from_str(blob).map_err(|e| StrategyError::Parse(e.to_string()))?;

        Ok(self.walk(&data))
    }

    /// Depth-first search, in document order, for a titled item with a
    /// playable URL
    fn walk(&self, value: &Value) -> Option<Candidate> {
        match value {
            Value::Object(map) => {
                let titled = map
                    .get("title")
                    .and_then(Value::as_str)
                    .is_some_and(|t| contains_ignore_case(t, &self.keyword));

                if titled {
                    if let Ok(item) = serde_json::from_value::<MediaItem>(value.clone()) {
                        if let Some(url) = item.any_playback(&self.playback_format) {
                            return Some(Candidate::new(
                                item.title_or("Condensed Game"),
                                url,
                                StrategyKind::EmbeddedData,
                            ));
                        }
                    }
                }

                map.values().find_map(|v| self.walk(v))
            }
            Value::Array(items) => items.iter().find_map(|v| self.walk(v)),
            _ => None,
        }
    }

    async fn lookup(&self, event_id: &str) -> Result<Option<Candidate>, StrategyError> {
        let url = event_url(&self.url_template, event_id);
        let page = self.fetcher.get_text(&url).await?;
        self.extract(&page)
    }
}

#[async_trait]
impl Strategy for EmbeddedDataStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EmbeddedData
    }

    async fn attempt(&self, event_id: &str) -> Option<Candidate> {
        settle(self.kind(), event_id, self.lookup(event_id).await)
    }
}
