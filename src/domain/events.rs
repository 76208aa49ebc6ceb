//! Scheduled events (games) read from the upstream schedule.
//!
//! Events are sourced fresh on every run and never mutated or deleted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single scheduled occurrence for the tracked team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque upstream identifier (the MLB `gamePk`)
    pub id: String,

    /// Scheduled start time (ISO 8601)
    pub timestamp: DateTime<Utc>,

    /// Whether the event has finished
    pub status: EventStatus,
}

impl Event {
    /// Create a completed event
    pub fn completed(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            status: EventStatus::Completed,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == EventStatus::Completed
    }
}

/// Completion status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Final; highlights may exist
    Completed,

    /// Scheduled, live, postponed or anything else
    Incomplete,
}
