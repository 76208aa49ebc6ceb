//! Core pipeline logic.
//!
//! This module contains:
//! - ScheduleSource: Completed events for the tracked team
//! - VideoLocator: Ordered strategy chain resolving a highlight URL
//! - DedupStore: Append-only log of announced events
//! - Orchestrator: One end-to-end pass

pub mod dedup;
pub mod locator;
pub mod orchestrator;
pub mod schedule;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use dedup::{DedupError, DedupStore};
pub use locator::{
    ContentFeedStrategy, EmbeddedDataStrategy, MarkupScanStrategy, Strategy, StrategyError,
    VideoLocator,
};
pub use orchestrator::{arrange, Orchestrator, RunError};
pub use schedule::{MlbSchedule, ScheduleError, ScheduleFetch, ScheduleSource, Window};
