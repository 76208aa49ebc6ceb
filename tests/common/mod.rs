//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use condensed_bot::adapters::{FetchError, Fetcher, Notifier};
use condensed_bot::config::{
    event_url, AppConfig, DEFAULT_CONTENT_URL, DEFAULT_EMBEDDED_PAGE_URL, DEFAULT_MARKUP_PAGE_URL,
};
use condensed_bot::core::{ScheduleError, ScheduleFetch, ScheduleSource, Window};
use condensed_bot::domain::Event;

/// Fetcher answering from a fixed URL → body table; unknown URLs are 404
#[derive(Clone, Default)]
pub struct RoutedFetcher {
    routes: Arc<Mutex<Vec<(String, Result<String, FetchError>)>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RoutedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.lock().unwrap().push((url.into(), Ok(body.into())));
        self
    }

    pub fn fail(self, url: impl Into<String>, error: FetchError) -> Self {
        self.routes.lock().unwrap().push((url.into(), Err(error)));
        self
    }

    /// Number of requests made to exactly `url`
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for RoutedFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(u, _)| u == url) {
            Some((_, response)) => response.clone(),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Schedule returning a fixed answer
pub struct StaticSchedule {
    events: Vec<Event>,
    error: Option<ScheduleError>,
    calls: Arc<AtomicUsize>,
}

impl StaticSchedule {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            events: Vec::new(),
            error: Some(ScheduleError::Fetch(FetchError::Timeout(
                "https://statsapi.mlb.com/api/v1/schedule".to_string(),
            ))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ScheduleSource for StaticSchedule {
    async fn completed_events(&self, _window: &Window) -> ScheduleFetch {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ScheduleFetch {
            events: self.events.clone(),
            error: self.error.clone(),
        }
    }
}

/// What a `MockNotifier` was asked to send
#[derive(Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<(String, String)>>>);

impl Outbox {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(_, u)| u.clone()).collect()
    }
}

/// Notifier that records calls and answers with a fixed result
pub struct MockNotifier {
    succeed: bool,
    outbox: Outbox,
}

impl MockNotifier {
    pub fn succeeding(outbox: &Outbox) -> Self {
        Self {
            succeed: true,
            outbox: outbox.clone(),
        }
    }

    pub fn failing(outbox: &Outbox) -> Self {
        Self {
            succeed: false,
            outbox: outbox.clone(),
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, title: &str, url: &str) -> bool {
        self.outbox
            .0
            .lock()
            .unwrap()
            .push((title.to_string(), url.to_string()));
        self.succeed
    }
}

/// A completed game on 2025-06-`day` at 02:05 UTC
pub fn game(id: &str, day: u32) -> Event {
    Event::completed(id, Utc.with_ymd_and_hms(2025, 6, day, 2, 5, 0).unwrap())
}

pub fn window() -> Window {
    Window::around(chrono::NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), 3, 1)
}

pub fn feed_url(event_id: &str) -> String {
    event_url(DEFAULT_CONTENT_URL, event_id)
}

pub fn embedded_url(event_id: &str) -> String {
    event_url(DEFAULT_EMBEDDED_PAGE_URL, event_id)
}

pub fn markup_url(event_id: &str) -> String {
    event_url(DEFAULT_MARKUP_PAGE_URL, event_id)
}

/// Content feed body holding one condensed-game item with an mp4 playback
pub fn feed_with_video(video_url: &str) -> String {
    serde_json::json!({
        "highlights": {"highlights": {"items": [
            {"title": "Inning recap", "playbacks": [{"name": "mp4Avc", "url": "https://x.test/recap.mp4"}]},
            {"title": "Condensed Game: SF@LAD - 6/1/25", "url": "/video/condensed",
             "playbacks": [{"name": "mp4Avc", "url": video_url}]}
        ]}}
    })
    .to_string()
}

/// Content feed body with highlights but no condensed game yet
pub fn feed_without_video() -> String {
    serde_json::json!({
        "highlights": {"highlights": {"items": [
            {"title": "Inning recap", "playbacks": [{"name": "mp4Avc", "url": "https://x.test/recap.mp4"}]}
        ]}}
    })
    .to_string()
}

pub fn config() -> AppConfig {
    AppConfig::default()
}
