//! In-memory doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::adapters::{FetchError, Fetcher};
use crate::core::locator::Strategy;
use crate::domain::{Candidate, StrategyKind};

enum Route {
    Exact(String),
    Prefix(String),
}

impl Route {
    fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(u) => u == url,
            Self::Prefix(p) => url.starts_with(p.as_str()),
        }
    }
}

/// Canned responses by URL; anything unrouted is a 404
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<Vec<(Route, Result<String, FetchError>)>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: &str) -> Self {
        self.route(Route::Exact(url.to_string()), Ok(body.to_string()))
    }

    pub fn with_prefix(self, prefix: &str, body: &str) -> Self {
        self.route(Route::Prefix(prefix.to_string()), Ok(body.to_string()))
    }

    pub fn with_error(self, url: &str, error: FetchError) -> Self {
        self.route(Route::Exact(url.to_string()), Err(error))
    }

    fn route(self, route: Route, response: Result<String, FetchError>) -> Self {
        self.routes.lock().unwrap().push((route, response));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|(route, _)| route.matches(url))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            })
    }
}

/// Shared view of a strategy's call count
#[derive(Clone)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Strategy with a fixed answer that counts its invocations
pub struct CountingStrategy {
    kind: StrategyKind,
    answer: Option<Candidate>,
    calls: Arc<AtomicUsize>,
}

impl CountingStrategy {
    pub fn hit(kind: StrategyKind, url: &str) -> Self {
        Self {
            kind,
            answer: Some(Candidate::new("Condensed Game", url, kind)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn miss(kind: StrategyKind) -> Self {
        Self {
            kind,
            answer: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counter(&self) -> CallCounter {
        CallCounter(self.calls.clone())
    }
}

#[async_trait]
impl Strategy for CountingStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn attempt(&self, _event_id: &str) -> Option<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}
