//! Run orchestrator.
//!
//! One pass: read the schedule, walk completed events in the configured
//! order, locate a video for the first unannounced one, announce it, and
//! record it. At most one announcement is delivered per pass, and an event
//! is recorded only after delivery succeeded.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::adapters::{Fetcher, Notifier};
use crate::config::{AppConfig, MissingVideoPolicy, TraversalOrder};
use crate::domain::{Event, EventDecision, RunOutcome, RunReport, RunState};

use super::dedup::{DedupError, DedupStore};
use super::locator::VideoLocator;
use super::schedule::{MlbSchedule, ScheduleError, ScheduleSource, Window};

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Storage(#[from] DedupError),

    #[error("upstream schedule unavailable: {0}")]
    UpstreamUnavailable(ScheduleError),
}

/// Order completed events for traversal
pub fn arrange(order: TraversalOrder, mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    match order {
        TraversalOrder::OldestFirst => events,
        TraversalOrder::NewestFirst => {
            events.reverse();
            events
        }
        TraversalOrder::LatestOnly => events.pop().into_iter().collect(),
    }
}

/// Policy knobs read from the configuration
#[derive(Debug, Clone, Copy)]
struct RunPolicy {
    order: TraversalOrder,
    missing_video: MissingVideoPolicy,
    force: bool,
    fail_on_upstream_error: bool,
}

/// Main orchestrator
pub struct Orchestrator {
    schedule: Box<dyn ScheduleSource>,
    locator: VideoLocator,
    notifier: Box<dyn Notifier>,
    policy: RunPolicy,
}

impl Orchestrator {
    /// Assemble from explicit collaborators
    pub fn new(
        config: &AppConfig,
        schedule: Box<dyn ScheduleSource>,
        locator: VideoLocator,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            schedule,
            locator,
            notifier,
            policy: RunPolicy {
                order: config.order,
                missing_video: config.missing_video,
                force: config.force,
                fail_on_upstream_error: config.fail_on_upstream_error,
            },
        }
    }

    /// The standard MLB schedule and strategy chain over `fetcher`
    pub fn from_config(
        config: &AppConfig,
        fetcher: Arc<dyn Fetcher>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self::new(
            config,
            Box::new(MlbSchedule::new(config, fetcher.clone())),
            VideoLocator::from_config(config, fetcher),
            notifier,
        )
    }

    /// Execute one pass over `window`.
    ///
    /// Returns `Err` only for storage failures, or for an unreachable
    /// schedule when configured to treat that as fatal.
    #[instrument(
        skip(self, store, window),
        fields(start = %window.start, end = %window.end, order = ?self.policy.order)
    )]
    pub async fn run(&self, store: &mut DedupStore, window: &Window) -> Result<RunReport, RunError> {
        let mut report = RunReport::new();

        report.enter(RunState::FetchingSchedule);
        let fetch = self.schedule.completed_events(window).await;

        if let Some(error) = fetch.error {
            if self.policy.fail_on_upstream_error {
                return Err(RunError::UpstreamUnavailable(error));
            }
            warn!(error = %error, "Schedule unavailable, nothing to do this run");
            return Ok(report.finish(RunOutcome::Skipped));
        }

        let events = arrange(self.policy.order, fetch.events);
        if events.is_empty() {
            info!("No recent completed games");
            return Ok(report.finish(RunOutcome::Skipped));
        }

        info!(count = events.len(), "Completed games to check");

        for event in &events {
            report.enter(RunState::SelectingEvent);
            let event_id = event.id.as_str();
            let seen = store.was_notified(event_id);

            if seen && !self.policy.force {
                info!(%event_id, "Already posted");
                report.decide(EventDecision::AlreadyNotified {
                    event_id: event_id.to_string(),
                });
                continue;
            }

            report.enter(RunState::LocatingVideo);
            let Some(candidate) = self.locator.resolve(event_id).await else {
                let marked = self.policy.missing_video == MissingVideoPolicy::MarkSeen && !seen;
                if marked {
                    report.enter(RunState::Recording);
                    store.mark_notified(event_id).await?;
                }
                info!(%event_id, marked, "No condensed game found");
                report.decide(EventDecision::NoVideo {
                    event_id: event_id.to_string(),
                    marked,
                });
                continue;
            };

            report.enter(RunState::Notifying);
            if !self.notifier.send(&candidate.title, &candidate.url).await {
                warn!(%event_id, notifier = self.notifier.name(), "Delivery failed, will retry next run");
                report.decide(EventDecision::NotifyFailed {
                    event_id: event_id.to_string(),
                });
                return Ok(report.finish(RunOutcome::Failed {
                    reason: format!("{} delivery failed for {}", self.notifier.name(), event_id),
                }));
            }

            report.enter(RunState::Recording);
            // Forced re-sends must not duplicate the log line
            if !seen {
                store.mark_notified(event_id).await?;
            }

            info!(%event_id, strategy = %candidate.strategy, "Posted");
            report.decide(EventDecision::Notified {
                event_id: event_id.to_string(),
            });
            return Ok(report.finish(RunOutcome::Done {
                event_id: event_id.to_string(),
                candidate,
            }));
        }

        Ok(report.finish(RunOutcome::Skipped))
    }

    /// Execute one pass over the configured window around today
    pub async fn run_now(&self, config: &AppConfig, store: &mut DedupStore) -> Result<RunReport, RunError> {
        self.run(store, &Window::from_config(config)).await
    }
}
