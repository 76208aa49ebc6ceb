//! Command-line interface for condensed-bot.
//!
//! Provides commands for running a notification pass, probing the
//! strategy chain for one game, and inspecting schedule, log and config.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use crate::adapters::{
    DryRunNotifier, Fetcher, HttpFetcher, LogSync, MirrorSync, NoopSync, Notifier, TelegramClient,
    TelegramNotifier,
};
use crate::config::{AppConfig, MissingVideoPolicy, TraversalOrder};
use crate::core::{DedupStore, MlbSchedule, Orchestrator, RunError, ScheduleSource, VideoLocator, Window};
use crate::domain::{EventDecision, RunOutcome, RunReport};

/// Exit code for an unreachable schedule when that is configured as fatal
const EXIT_UPSTREAM_UNAVAILABLE: u8 = 2;

/// condensed-bot - posts condensed-game videos to Telegram, once per game
#[derive(Parser, Debug)]
#[command(name = "condensed-bot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check recent games and announce at most one new video
    Run {
        /// Announce even if the game is already in the posted log
        #[arg(long)]
        force: bool,

        /// Order in which completed games are checked
        #[arg(long, value_enum)]
        order: Option<OrderArg>,

        /// What to do with games that have no video yet
        #[arg(long, value_enum)]
        missing_video: Option<MissingVideoArg>,

        /// Team id to track
        #[arg(long)]
        team: Option<u32>,

        /// Log the message instead of sending it; nothing is recorded
        #[arg(long)]
        dry_run: bool,

        /// Exit with a distinct status when the schedule cannot be fetched
        #[arg(long)]
        fail_on_upstream_error: bool,
    },

    /// Run the strategy chain for one game and print what it finds
    Locate {
        /// Game id (gamePk)
        event_id: String,
    },

    /// List completed games in the current window
    Schedule {
        /// Team id to track
        #[arg(long)]
        team: Option<u32>,
    },

    /// Show the posted log
    Posted {
        /// Maximum number of records to show (most recent)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Traversal order for CLI (maps to TraversalOrder)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    NewestFirst,
    OldestFirst,
    LatestOnly,
}

impl From<OrderArg> for TraversalOrder {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::NewestFirst => TraversalOrder::NewestFirst,
            OrderArg::OldestFirst => TraversalOrder::OldestFirst,
            OrderArg::LatestOnly => TraversalOrder::LatestOnly,
        }
    }
}

/// Missing-video policy for CLI (maps to MissingVideoPolicy)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MissingVideoArg {
    /// Look again next run
    Retry,

    /// Record the game so it is not looked up again
    MarkSeen,
}

impl From<MissingVideoArg> for MissingVideoPolicy {
    fn from(m: MissingVideoArg) -> Self {
        match m {
            MissingVideoArg::Retry => MissingVideoPolicy::Retry,
            MissingVideoArg::MarkSeen => MissingVideoPolicy::MarkSeen,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<ExitCode> {
        let mut config = AppConfig::load()?;

        match self.command {
            Commands::Run {
                force,
                order,
                missing_video,
                team,
                dry_run,
                fail_on_upstream_error,
            } => {
                config.force = force;
                if let Some(order) = order {
                    config.order = order.into();
                }
                if let Some(policy) = missing_video {
                    config.missing_video = policy.into();
                }
                if let Some(team) = team {
                    config.team_id = team;
                }
                config.fail_on_upstream_error |= fail_on_upstream_error;

                run_once(&config, dry_run).await
            }
            Commands::Locate { event_id } => {
                locate(&config, &event_id).await?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Schedule { team } => {
                if let Some(team) = team {
                    config.team_id = team;
                }
                show_schedule(&config).await?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Posted { limit } => {
                show_posted(&config, limit).await?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Config => {
                show_config(&config);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn http_fetcher(config: &AppConfig) -> Result<Arc<dyn Fetcher>> {
    let fetcher = HttpFetcher::new(config.http_timeout, config.max_page_bytes)
        .context("Failed to build HTTP client")?;
    Ok(Arc::new(fetcher))
}

fn log_sync(config: &AppConfig) -> Box<dyn LogSync> {
    match &config.mirror_path {
        Some(mirror) => Box::new(MirrorSync::new(mirror)),
        None => Box::new(NoopSync),
    }
}

fn notifier(config: &AppConfig, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(DryRunNotifier));
    }

    let telegram = config.require_telegram()?.clone();
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build Telegram HTTP client")?;

    Ok(Box::new(TelegramNotifier::new(
        TelegramClient::from_config(telegram, client),
        config.copy_lines.clone(),
        config.footer.clone(),
    )))
}

async fn run_once(config: &AppConfig, dry_run: bool) -> Result<ExitCode> {
    let notifier = notifier(config, dry_run)?;
    let orchestrator = Orchestrator::from_config(config, http_fetcher(config)?, notifier);

    let mut store = DedupStore::open_with_sync(&config.posted_log, log_sync(config)).await?;
    if dry_run {
        store = store.detach();
    }

    match orchestrator.run_now(config, &mut store).await {
        Ok(report) => {
            print_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        Err(RunError::UpstreamUnavailable(e)) => {
            error!(error = %e, "Schedule unavailable");
            Ok(ExitCode::from(EXIT_UPSTREAM_UNAVAILABLE))
        }
        Err(e) => Err(e).context("Run aborted"),
    }
}

fn print_report(report: &RunReport) {
    for decision in &report.decisions {
        match decision {
            EventDecision::AlreadyNotified { event_id } => {
                println!("  {} already posted", event_id);
            }
            EventDecision::NoVideo { event_id, marked } => {
                let note = if *marked { " (marked seen)" } else { "" };
                println!("  {} no condensed game found{}", event_id, note);
            }
            EventDecision::NotifyFailed { event_id } => {
                println!("  {} delivery failed", event_id);
            }
            EventDecision::Notified { event_id } => {
                println!("  {} posted", event_id);
            }
        }
    }

    match &report.outcome {
        RunOutcome::Done {
            event_id,
            candidate,
        } => {
            println!(
                "Posted {} via {}: {}",
                event_id, candidate.strategy, candidate.url
            );
        }
        RunOutcome::Skipped => println!("Nothing new to post"),
        RunOutcome::Failed { reason } => println!("Run failed: {}", reason),
    }
}

async fn locate(config: &AppConfig, event_id: &str) -> Result<()> {
    let locator = VideoLocator::from_config(config, http_fetcher(config)?);

    match locator.resolve(event_id).await {
        Some(candidate) => {
            println!("Title:    {}", candidate.title);
            println!("URL:      {}", candidate.url);
            println!("Strategy: {}", candidate.strategy);
        }
        None => println!("No condensed game found for {}", event_id),
    }

    Ok(())
}

async fn show_schedule(config: &AppConfig) -> Result<()> {
    let schedule = MlbSchedule::new(config, http_fetcher(config)?);
    let window = Window::from_config(config);
    let fetch = schedule.completed_events(&window).await;

    if let Some(e) = fetch.error {
        anyhow::bail!("Failed to fetch schedule: {}", e);
    }

    println!(
        "Completed games for team {} ({} to {}):",
        config.team_id, window.start, window.end
    );
    if fetch.events.is_empty() {
        println!("  (none)");
    }
    for event in &fetch.events {
        println!("  {}  {}", event.id, event.timestamp.to_rfc3339());
    }

    Ok(())
}

async fn show_posted(config: &AppConfig, limit: usize) -> Result<()> {
    let store = DedupStore::open_with_sync(&config.posted_log, log_sync(config)).await?;

    println!("Posted log: {}", config.posted_log.display());
    let records = store.records();
    let skip = records.len().saturating_sub(limit);

    for record in &records[skip..] {
        match record.posted_at {
            Some(ts) => println!("  {}  {}", record.event_id, ts.to_rfc3339()),
            None => println!("  {}", record.event_id),
        }
    }
    println!("{} total", records.len());

    Ok(())
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

fn show_config(config: &AppConfig) {
    println!(
        "Config file:     {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Home:            {}", config.home.display());
    println!("Posted log:      {}", config.posted_log.display());
    println!(
        "Mirror:          {}",
        config
            .mirror_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Team:            {}", config.team_id);
    println!(
        "Window:          -{}d / +{}d",
        config.lookback_days, config.lookahead_days
    );
    println!("Keyword:         {}", config.keyword);
    println!("Order:           {:?}", config.order);
    println!("Missing video:   {:?}", config.missing_video);
    println!("HTTP timeout:    {:?}", config.http_timeout);
    match &config.telegram {
        Some(t) => println!("Telegram:        chat {} (token {})", t.chat_id, mask(&t.bot_token)),
        None => println!("Telegram:        (not configured)"),
    }
}
