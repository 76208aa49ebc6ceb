//! Orchestrator run states and the report returned from a pass.
//!
//! A run walks `Idle → FetchingSchedule → SelectingEvent → LocatingVideo →
//! Notifying → Recording` and ends in exactly one terminal state.

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;

/// States of a single orchestrator pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    FetchingSchedule,
    SelectingEvent,
    LocatingVideo,
    Notifying,
    Recording,

    /// One announcement delivered and recorded
    Done,

    /// Nothing to announce this time
    Skipped,

    /// Upstream unavailable or delivery failed
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Failed)
    }
}

/// What happened to one inspected event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum EventDecision {
    /// Already in the dedup log; not looked up
    AlreadyNotified { event_id: String },

    /// No strategy found a video
    NoVideo { event_id: String, marked: bool },

    /// Notifier reported failure; left unmarked
    NotifyFailed { event_id: String },

    /// Announced and recorded
    Notified { event_id: String },
}

impl EventDecision {
    pub fn event_id(&self) -> &str {
        match self {
            Self::AlreadyNotified { event_id }
            | Self::NoVideo { event_id, .. }
            | Self::NotifyFailed { event_id }
            | Self::Notified { event_id } => event_id,
        }
    }
}

/// Terminal outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Done {
        event_id: String,
        candidate: Candidate,
    },
    Skipped,
    Failed {
        reason: String,
    },
}

impl RunOutcome {
    /// Terminal state corresponding to this outcome
    pub fn state(&self) -> RunState {
        match self {
            Self::Done { .. } => RunState::Done,
            Self::Skipped => RunState::Skipped,
            Self::Failed { .. } => RunState::Failed,
        }
    }
}

/// Everything one pass did, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// States visited, starting at `Idle`
    pub trail: Vec<RunState>,

    /// One entry per inspected event
    pub decisions: Vec<EventDecision>,

    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            trail: vec![RunState::Idle],
            decisions: Vec::new(),
            outcome: RunOutcome::Skipped,
        }
    }

    /// Record a state transition
    pub fn enter(&mut self, state: RunState) {
        self.trail.push(state);
    }

    pub fn decide(&mut self, decision: EventDecision) {
        self.decisions.push(decision);
    }

    /// Set the outcome and append its terminal state to the trail
    pub fn finish(mut self, outcome: RunOutcome) -> Self {
        self.trail.push(outcome.state());
        self.outcome = outcome;
        self
    }

    pub fn state(&self) -> RunState {
        self.trail.last().copied().unwrap_or(RunState::Idle)
    }

    /// Number of announcements delivered (0 or 1)
    pub fn notified_count(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, EventDecision::Notified { .. }))
            .count()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StrategyKind;

    #[test]
    fn test_new_report_starts_idle() {
        let report = RunReport::new();
        assert_eq!(report.state(), RunState::Idle);
        assert!(!report.state().is_terminal());
    }

    #[test]
    fn test_finish_appends_terminal_state() {
        let mut report = RunReport::new();
        report.enter(RunState::FetchingSchedule);

        let report = report.finish(RunOutcome::Done {
            event_id: "1".to_string(),
            candidate: Candidate::new("t", "u", StrategyKind::ContentFeed),
        });

        assert_eq!(
            report.trail,
            vec![RunState::Idle, RunState::FetchingSchedule, RunState::Done]
        );
        assert!(report.state().is_terminal());
    }

    #[test]
    fn test_notified_count() {
        let mut report = RunReport::new();
        report.decide(EventDecision::AlreadyNotified {
            event_id: "1".to_string(),
        });
        report.decide(EventDecision::Notified {
            event_id: "2".to_string(),
        });

        assert_eq!(report.notified_count(), 1);
        assert_eq!(report.decisions[1].event_id(), "2");
    }
}
