use std::time::Duration;

use anyhow::{Context, Result};
use html_escape::encode_text;
use reqwest::Client;
use serde::Serialize;

use super::Notifier;
use crate::normalize::NormalizedItem;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    disable_link_preview: bool,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building telegram http client")?;
        Ok(Self {
            api_base: TELEGRAM_API_BASE.to_string(),
            token,
            chat_id,
            disable_link_preview: false,
            client,
        })
    }

    /// Point the notifier at a different API host. Tests use this to talk
    /// to a local mock server.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_link_preview_disabled(mut self, disabled: bool) -> Self {
        self.disable_link_preview = disabled;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

/// Body for the Bot API `sendMessage` call.
#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Render the message layout: bold title, summary when present, the link
/// on its own line, and a trailing source attribution. Everything is
/// entity-escaped for Telegram's HTML dialect.
pub fn render_message(item: &NormalizedItem) -> String {
    let mut lines = Vec::new();
    if !item.title.is_empty() {
        lines.push(format!("<b>{}</b>", encode_text(&item.title)));
    }
    if !item.summary.is_empty() {
        lines.push(encode_text(&item.summary).to_string());
    }
    if !item.link.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(encode_text(&item.link).to_string());
    }
    if !item.source.is_empty() {
        lines.push(format!("via {}", encode_text(&item.source)));
    }
    lines.join("\n")
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, item: &NormalizedItem) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: render_message(item),
            parse_mode: "HTML",
            disable_web_page_preview: self.disable_link_preview,
        };
        self.client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .context("telegram send")?
            .error_for_status()
            .context("telegram non-2xx")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str, link: &str, source: &str) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            summary: summary.to_string(),
            link: link.to_string(),
            source: source.to_string(),
            published_at: 0,
            fingerprint: "f".repeat(64),
        }
    }

    #[test]
    fn full_item_renders_all_lines() {
        let text = render_message(&item(
            "Big <News>",
            "A & B happened",
            "https://e.x/1?a=1&b=2",
            "Herald",
        ));
        assert_eq!(
            text,
            "<b>Big &lt;News&gt;</b>\nA &amp; B happened\n\nhttps://e.x/1?a=1&amp;b=2\nvia Herald"
        );
    }

    #[test]
    fn link_only_item_renders_minimal_message() {
        let text = render_message(&item("", "", "https://e.x/only", "Herald"));
        assert_eq!(text, "https://e.x/only\nvia Herald");
    }

    #[test]
    fn summary_line_is_omitted_when_empty() {
        let text = render_message(&item("T", "", "https://e.x/1", "S"));
        assert!(!text.contains("\n\n\n"));
        assert!(text.starts_with("<b>T</b>\n\n"));
    }
}
