//! Configuration for the bot.
//!
//! Configuration sources (highest priority first):
//! 1. CLI flags (applied by the caller on the returned value)
//! 2. Environment variables (TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID, CONDENSED_HOME),
//!    including a `.env` file in the working directory
//! 3. Config file (.condensed/config.yaml)
//! 4. Defaults (~/.condensed)
//!
//! Config file discovery:
//! - Searches current directory and parents for .condensed/config.yaml
//! - Relative paths in the config file resolve against the project root
//!   (the directory holding `.condensed/`)
//!
//! The resolved `AppConfig` is passed explicitly to every component.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::TelegramConfig;

/// San Francisco Giants
pub const DEFAULT_TEAM_ID: u32 = 137;

pub const DEFAULT_SCHEDULE_URL: &str = "https://statsapi.mlb.com/api/v1/schedule?sportId=1&teamId={team_id}&startDate={start}&endDate={end}";
pub const DEFAULT_CONTENT_URL: &str = "https://statsapi.mlb.com/api/v1/game/{event_id}/content";
pub const DEFAULT_EMBEDDED_PAGE_URL: &str = "https://www.mlb.com/gameday/{event_id}/final/video";
/// Largest accepted `lookback_days` / `lookahead_days`
pub const MAX_WINDOW_DAYS: i64 = 366;

pub const DEFAULT_MARKUP_PAGE_URL: &str = "https://www.mlb.com/gameday/{event_id}/final/wrap";

/// Order in which completed events are considered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Most recent game first
    NewestFirst,

    /// Oldest game in the window first
    OldestFirst,

    /// Only the most recent game; older ones are ignored
    LatestOnly,
}

/// What to do with an event for which no video was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVideoPolicy {
    /// Leave it open; the next run looks again
    Retry,

    /// Record it in the dedup log so it is never looked up again
    MarkSeen,
}

/// Upstream endpoint templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Placeholders: `{team_id}`, `{start}`, `{end}`
    pub schedule_url: String,
    /// Placeholder: `{event_id}`
    pub content_url: String,
    pub embedded_page_url: String,
    pub markup_page_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
            embedded_page_url: DEFAULT_EMBEDDED_PAGE_URL.to_string(),
            markup_page_url: DEFAULT_MARKUP_PAGE_URL.to_string(),
        }
    }
}

/// Substitute `{event_id}` in an endpoint template
pub fn event_url(template: &str, event_id: &str) -> String {
    template.replace("{event_id}", event_id)
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub team_id: Option<u32>,
    pub lookback_days: Option<i64>,
    pub lookahead_days: Option<i64>,
    pub keyword: Option<String>,
    pub playback_format: Option<String>,
    pub completed_states: Option<Vec<String>>,
    pub order: Option<TraversalOrder>,
    pub missing_video: Option<MissingVideoPolicy>,
    pub fail_on_upstream_error: Option<bool>,
    pub http_timeout_seconds: Option<u64>,
    pub max_page_bytes: Option<usize>,
    pub endpoints: Option<EndpointsFile>,
    pub posted_log: Option<String>,
    pub mirror_path: Option<String>,
    pub copy_lines: Vec<String>,
    pub footer: Option<String>,
    pub telegram: Option<TelegramFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointsFile {
    pub schedule_url: Option<String>,
    pub content_url: Option<String>,
    pub embedded_page_url: Option<String>,
    pub markup_page_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramFile {
    pub chat_id: Option<String>,
    pub api_base: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Tracked team
    pub team_id: u32,
    /// Days before today included in the schedule window
    pub lookback_days: i64,
    /// Days after today included in the schedule window
    pub lookahead_days: i64,
    /// Case-insensitive token identifying the wanted video
    pub keyword: String,
    /// Playback variant name token treated as canonical (e.g. "mp4")
    pub playback_format: String,
    /// Upstream `detailedState` values that count as completed
    pub completed_states: Vec<String>,
    pub order: TraversalOrder,
    pub missing_video: MissingVideoPolicy,
    /// Bypass the already-notified gate
    pub force: bool,
    /// Treat an unreachable schedule as a failed run
    pub fail_on_upstream_error: bool,
    pub http_timeout: Duration,
    /// Pages are truncated to this many bytes before pattern matching
    pub max_page_bytes: usize,
    pub endpoints: Endpoints,
    /// Bot state directory
    pub home: PathBuf,
    /// Newline-delimited posted-games log
    pub posted_log: PathBuf,
    /// Optional mirror for the posted log
    pub mirror_path: Option<PathBuf>,
    /// Flavor lines for announcements
    pub copy_lines: Vec<String>,
    /// Monospace sign-off line closing every announcement
    pub footer: Option<String>,
    /// Present only when both token and chat id are known
    pub telegram: Option<TelegramConfig>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = PathBuf::from(".condensed");
        Self {
            team_id: DEFAULT_TEAM_ID,
            lookback_days: 3,
            lookahead_days: 1,
            keyword: "condensed".to_string(),
            playback_format: "mp4".to_string(),
            completed_states: vec!["Final".to_string()],
            order: TraversalOrder::NewestFirst,
            missing_video: MissingVideoPolicy::Retry,
            force: false,
            fail_on_upstream_error: false,
            http_timeout: Duration::from_secs(10),
            max_page_bytes: 4 * 1024 * 1024,
            endpoints: Endpoints::default(),
            posted_log: home.join("posted_games.txt"),
            home,
            mirror_path: None,
            copy_lines: Vec::new(),
            footer: None,
            telegram: None,
            config_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the environment and the discovered config file
    pub fn load() -> Result<Self> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();

        let config_file = find_config_file();
        let raw = match config_file {
            Some(ref path) => Some(load_config_file(path)?),
            None => None,
        };

        let default_home = dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(".condensed");

        Self::resolve(raw, config_file, default_home, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file, environment lookups and defaults.
    ///
    /// Fails on out-of-range window sizes.
    pub fn resolve<F>(
        raw: Option<ConfigFile>,
        config_file: Option<PathBuf>,
        default_home: PathBuf,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let raw = raw.unwrap_or_default();

        // Project root is the parent of .condensed/
        let base_dir = config_file
            .as_deref()
            .and_then(|p| p.parent())
            .and_then(|p| p.parent())
            .map(Path::to_path_buf);

        let home = env("CONDENSED_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default_home);

        let posted_log = match (&raw.posted_log, &base_dir) {
            (Some(p), Some(base)) => resolve_path(base, p),
            (Some(p), None) => PathBuf::from(p),
            (None, _) => home.join("posted_games.txt"),
        };

        let mirror_path = raw.mirror_path.as_ref().map(|p| match &base_dir {
            Some(base) => resolve_path(base, p),
            None => PathBuf::from(p),
        });

        let endpoints_file = raw.endpoints.unwrap_or_default();
        let endpoints = Endpoints {
            schedule_url: endpoints_file
                .schedule_url
                .unwrap_or(defaults.endpoints.schedule_url),
            content_url: endpoints_file
                .content_url
                .unwrap_or(defaults.endpoints.content_url),
            embedded_page_url: endpoints_file
                .embedded_page_url
                .unwrap_or(defaults.endpoints.embedded_page_url),
            markup_page_url: endpoints_file
                .markup_page_url
                .unwrap_or(defaults.endpoints.markup_page_url),
        };

        let telegram_file = raw.telegram.unwrap_or_default();
        let bot_token = env("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty());
        let chat_id = env("TELEGRAM_CHAT_ID")
            .filter(|v| !v.is_empty())
            .or(telegram_file.chat_id);
        let telegram = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_base: telegram_file
                    .api_base
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
            }),
            _ => None,
        };

        let lookback_days = window_days("lookback_days", raw.lookback_days, defaults.lookback_days)?;
        let lookahead_days =
            window_days("lookahead_days", raw.lookahead_days, defaults.lookahead_days)?;

        Ok(Self {
            team_id: raw.team_id.unwrap_or(defaults.team_id),
            lookback_days,
            lookahead_days,
            keyword: raw.keyword.unwrap_or(defaults.keyword),
            playback_format: raw.playback_format.unwrap_or(defaults.playback_format),
            completed_states: raw.completed_states.unwrap_or(defaults.completed_states),
            order: raw.order.unwrap_or(defaults.order),
            missing_video: raw.missing_video.unwrap_or(defaults.missing_video),
            force: false,
            fail_on_upstream_error: raw
                .fail_on_upstream_error
                .unwrap_or(defaults.fail_on_upstream_error),
            http_timeout: raw
                .http_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            max_page_bytes: raw.max_page_bytes.unwrap_or(defaults.max_page_bytes),
            endpoints,
            home,
            posted_log,
            mirror_path,
            copy_lines: raw.copy_lines,
            footer: raw.footer.filter(|f| !f.trim().is_empty()),
            telegram,
            config_file,
        })
    }

    /// Telegram settings, or an error naming the missing variables
    pub fn require_telegram(&self) -> Result<&TelegramConfig> {
        self.telegram.as_ref().context(
            "Telegram is not configured: set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID",
        )
    }
}

fn window_days(key: &str, value: Option<i64>, default: i64) -> Result<i64> {
    let days = value.unwrap_or(default);
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        anyhow::bail!("{} must be between 0 and {}, got {}", key, MAX_WINDOW_DAYS, days);
    }
    Ok(days)
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".condensed").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
