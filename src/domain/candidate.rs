//! Located highlight videos.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A video URL resolved for one event. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Human-readable video title
    pub title: String,

    /// Playback or page URL
    pub url: String,

    /// Strategy that produced this candidate
    pub strategy: StrategyKind,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>, strategy: StrategyKind) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            strategy,
        }
    }
}

/// The extraction techniques, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// S1: structured content feed
    ContentFeed,

    /// S2: JSON blob embedded in a rendered page
    EmbeddedData,

    /// S3: regex scan of raw markup
    MarkupScan,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentFeed => "content_feed",
            Self::EmbeddedData => "embedded_data",
            Self::MarkupScan => "markup_scan",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
