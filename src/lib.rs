//! condensed-bot - condensed-game announcer
//!
//! Periodically checks whether a condensed-game video has been published
//! for a recently completed game of the tracked team and, if so, posts it
//! to a Telegram chat exactly once per game.
//!
//! # Architecture
//!
//! One run is a single sequential pass:
//! - Read completed games for a date window from the schedule
//! - Skip games already in the posted log
//! - Try an ordered chain of video-locating strategies (first match wins)
//! - Announce the first video found, and record the game only if delivery succeeded
//!
//! Runs must not overlap; the posted log is read once and appended to
//! without locking.
//!
//! # Modules
//!
//! - `adapters`: External system integrations (HTTP, Telegram, log sync)
//! - `core`: Schedule, locator strategies, dedup store, orchestrator
//! - `domain`: Data structures (Event, Candidate, PostedRecord, RunReport)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # One pass (e.g. from cron or a CI schedule)
//! condensed-bot run
//!
//! # See what the strategies find for a game
//! condensed-bot locate 745123
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use config::{AppConfig, MissingVideoPolicy, TraversalOrder};
pub use crate::core::{DedupStore, Orchestrator, VideoLocator};
pub use domain::{Candidate, Event, EventDecision, PostedRecord, RunOutcome, RunReport, RunState};

// Telegram integration
pub use adapters::{TelegramClient, TelegramConfig};
