//! Telegram Bot API adapter for posting highlight announcements.
//!
//! Messages go out as HTML with link previews disabled, matching the
//! channel's existing post layout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::Notifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const TITLE_PREFIX: &str = "Condensed Game: ";

/// Telegram Bot API client
pub struct TelegramClient {
    /// Bot token
    bot_token: String,
    /// Target chat ID
    chat_id: String,
    /// API root, overridable for self-hosted Bot API servers
    api_base: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Response from Telegram API
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Message result from sendMessage
#[derive(Debug, Deserialize)]
struct MessageResult {
    message_id: i64,
}

/// Configuration for Telegram client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl TelegramClient {
    /// Create from config
    pub fn from_config(config: TelegramConfig, client: reqwest::Client) -> Self {
        Self {
            bot_token: config.bot_token,
            chat_id: config.chat_id,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build API URL
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Send an HTML-formatted text message, returning its message id
    pub async fn send_html(&self, text: &str) -> Result<i64> {
        let url = self.api_url("sendMessage");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }))
            .send()
            .await
            .context("Failed to send Telegram message")?;

        let status = response.status();
        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram response (HTTP {})", status))?;

        if !status.is_success() || !result.ok {
            anyhow::bail!(
                "Telegram API error (HTTP {}): {}",
                status.as_u16(),
                result.description.unwrap_or_default()
            );
        }

        Ok(result.result.map(|r| r.message_id).unwrap_or(0))
    }
}

/// Escape text for Telegram's HTML parse mode
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the announcement text for a video.
///
/// `footer` is set in monospace after the flavor line.
pub fn format_announcement(
    title: &str,
    url: &str,
    flavor: Option<&str>,
    footer: Option<&str>,
) -> String {
    let game_info = title
        .strip_prefix(TITLE_PREFIX)
        .unwrap_or(title)
        .trim();

    let mut message = format!(
        "<b>📼 {}</b>\n<code>────────────────────────────</code>\n🎥 <a href=\"{}\">▶ Watch Condensed Game</a>",
        escape_html(game_info),
        escape_html(url)
    );

    if let Some(line) = flavor {
        message.push_str(&format!("\n\n<i>{}</i>", escape_html(line)));
    }

    if let Some(footer) = footer {
        message.push_str(&format!("\n\n<code>{}</code>", escape_html(footer)));
    }

    message
}

/// `Notifier` that posts to a Telegram chat
pub struct TelegramNotifier {
    client: TelegramClient,
    /// Flavor lines; one is picked at random per message
    copy_lines: Vec<String>,
    footer: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient, copy_lines: Vec<String>, footer: Option<String>) -> Self {
        Self {
            client,
            copy_lines,
            footer,
        }
    }

    fn pick_flavor(&self) -> Option<String> {
        self.copy_lines.choose(&mut rand::thread_rng()).cloned()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, title: &str, url: &str) -> bool {
        let flavor = self.pick_flavor();
        let text = format_announcement(title, url, flavor.as_deref(), self.footer.as_deref());

        match self.client.send_html(&text).await {
            Ok(message_id) => {
                info!(message_id, "Sent to Telegram");
                true
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Telegram delivery failed");
                false
            }
        }
    }
}

/// `Notifier` that only logs what it would have sent
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send(&self, title: &str, url: &str) -> bool {
        let text = format_announcement(title, url, None, None);
        info!(%text, "Dry run, message not sent");
        true
    }
}
