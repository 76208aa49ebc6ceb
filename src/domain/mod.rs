//! Domain types for the highlight bot.
//!
//! This module contains the core data structures:
//! - Event: A completed game pulled from the schedule
//! - Candidate: A located highlight video
//! - PostedRecord: One line of the dedup log
//! - Run: Orchestrator states and the per-run report

pub mod candidate;
pub mod events;
pub mod record;
pub mod run;

// Re-export commonly used types
pub use candidate::{Candidate, StrategyKind};
pub use events::{Event, EventStatus};
pub use record::PostedRecord;
pub use run::{EventDecision, RunOutcome, RunReport, RunState};
