//! Schedule source: completed events for the tracked team.
//!
//! Fetch failures never abort a run. They come back next to an empty
//! event list so callers can tell "nothing played" from "couldn't ask".

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::adapters::{FetchError, Fetcher};
use crate::config::AppConfig;
use crate::domain::{Event, EventStatus};

/// Errors reported alongside an (empty) schedule
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("schedule response malformed: {0}")]
    Parse(String),
}

/// Inclusive date range queried from the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// `[today - lookback_days, today + lookahead_days]`, clamped to the
    /// representable date range
    pub fn around(today: NaiveDate, lookback_days: i64, lookahead_days: i64) -> Self {
        Self {
            start: Duration::try_days(lookback_days)
                .and_then(|d| today.checked_sub_signed(d))
                .unwrap_or(NaiveDate::MIN),
            end: Duration::try_days(lookahead_days)
                .and_then(|d| today.checked_add_signed(d))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Window around the current UTC date
    pub fn from_config(config: &AppConfig) -> Self {
        Self::around(
            Utc::now().date_naive(),
            config.lookback_days,
            config.lookahead_days,
        )
    }
}

/// Result of one schedule query
#[derive(Debug, Clone, Default)]
pub struct ScheduleFetch {
    /// Completed events, oldest first
    pub events: Vec<Event>,

    /// Set when the upstream could not be read
    pub error: Option<ScheduleError>,
}

impl ScheduleFetch {
    pub fn ok(events: Vec<Event>) -> Self {
        Self {
            events,
            error: None,
        }
    }

    pub fn failed(error: ScheduleError) -> Self {
        Self {
            events: Vec::new(),
            error: Some(error),
        }
    }
}

/// Source of completed events
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Completed events in `window`, sorted by timestamp ascending.
    ///
    /// Never fails: problems are reported in `ScheduleFetch::error`.
    async fn completed_events(&self, window: &Window) -> ScheduleFetch;
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ScheduledGame>,
}

#[derive(Debug, Deserialize)]
struct ScheduledGame {
    #[serde(rename = "gamePk")]
    game_pk: Option<u64>,
    #[serde(rename = "gameDate")]
    game_date: Option<String>,
    #[serde(default)]
    status: GameStatus,
}

#[derive(Debug, Default, Deserialize)]
struct GameStatus {
    #[serde(rename = "detailedState", default)]
    detailed_state: String,
}

/// MLB Stats API schedule
pub struct MlbSchedule {
    fetcher: Arc<dyn Fetcher>,
    url_template: String,
    team_id: u32,
    completed_states: Vec<String>,
}

impl MlbSchedule {
    pub fn new(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            url_template: config.endpoints.schedule_url.clone(),
            team_id: config.team_id,
            completed_states: config.completed_states.clone(),
        }
    }

    fn url(&self, window: &Window) -> String {
        self.url_template
            .replace("{team_id}", &self.team_id.to_string())
            .replace("{start}", &window.start.format("%Y-%m-%d").to_string())
            .replace("{end}", &window.end.format("%Y-%m-%d").to_string())
    }

    fn status_of(&self, detailed_state: &str) -> EventStatus {
        if self
            .completed_states
            .iter()
            .any(|s| s.eq_ignore_ascii_case(detailed_state))
        {
            EventStatus::Completed
        } else {
            EventStatus::Incomplete
        }
    }

    /// Parse a schedule body into completed events, oldest first
    pub fn parse(&self, body: &str) -> Result<Vec<Event>, ScheduleError> {
        let response: ScheduleResponse =
            serde_json::from_str(body).map_err(|e| ScheduleError::Parse(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for game in response.dates.into_iter().flat_map(|d| d.games) {
            let (Some(pk), Some(date)) = (game.game_pk, game.game_date.as_deref()) else {
                debug!("Skipping schedule entry without gamePk/gameDate");
                continue;
            };

            let status = self.status_of(&game.status.detailed_state);
            if status != EventStatus::Completed {
                continue;
            }

            let timestamp = match DateTime::parse_from_rfc3339(date) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    warn!(event_id = pk, error = %e, "Unparseable gameDate, skipping");
                    continue;
                }
            };

            // Resumed games can appear on two dates
            if seen.insert(pk) {
                events.push(Event {
                    id: pk.to_string(),
                    timestamp,
                    status,
                });
            }
        }

        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[async_trait]
impl ScheduleSource for MlbSchedule {
    async fn completed_events(&self, window: &Window) -> ScheduleFetch {
        let url = self.url(window);

        let body = match self.fetcher.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to fetch schedule");
                return ScheduleFetch::failed(e.into());
            }
        };

        match self.parse(&body) {
            Ok(events) => {
                debug!(count = events.len(), "Completed events in window");
                ScheduleFetch::ok(events)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse schedule");
                ScheduleFetch::failed(e)
            }
        }
    }
}
