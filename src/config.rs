// src/config.rs
//! Run configuration, resolved once from the environment. The pipeline
//! modules only ever see this value object, never the environment itself.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::normalize::DEFAULT_SUMMARY_MAX_CHARS;

pub const DEFAULT_STATE_PATH: &str = "state.json";
pub const DEFAULT_USER_AGENT: &str = "rss-courier/0.1";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub feed_urls: Vec<String>,
    pub state_path: PathBuf,
    pub max_items_per_run: usize,
    pub max_entries_per_feed: usize,
    pub seen_limit: usize,
    pub request_timeout: Duration,
    pub send_delay: Duration,
    pub one_per_source: bool,
    pub disable_link_preview: bool,
    pub summary_max_chars: usize,
    pub user_agent: String,
}

impl RunConfig {
    /// Resolve from the process environment. Missing required values fail
    /// fast, before any state is touched.
    pub fn from_env() -> Result<Self> {
        let bot_token = require("BOT_TOKEN")?;
        let chat_id = require("CHAT_ID")?;
        let feed_urls = parse_feed_urls(&require("FEED_URLS")?)?;

        Ok(Self {
            bot_token,
            chat_id,
            feed_urls,
            state_path: PathBuf::from(
                std::env::var("STATE_PATH").unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string()),
            ),
            max_items_per_run: env_parse("MAX_ITEMS_PER_RUN", 5),
            max_entries_per_feed: env_parse("MAX_ENTRIES_PER_FEED", 10),
            seen_limit: env_parse("SEEN_LIMIT", 300),
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS", 10)),
            send_delay: Duration::from_millis(env_parse("SEND_DELAY_MS", 1_200)),
            one_per_source: env_flag("ONE_PER_SOURCE", true),
            disable_link_preview: env_flag("DISABLE_LINK_PREVIEW", false),
            summary_max_chars: env_parse("SUMMARY_MAX_CHARS", DEFAULT_SUMMARY_MAX_CHARS),
            user_agent: std::env::var("USER_AGENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn require(key: &str) -> Result<String> {
    let v = std::env::var(key).with_context(|| format!("{key} is not set"))?;
    if v.trim().is_empty() {
        bail!("{key} is empty");
    }
    Ok(v.trim().to_string())
}

/// Comma-separated list; surrounding whitespace tolerated, empty entries
/// dropped.
fn parse_feed_urls(raw: &str) -> Result<Vec<String>> {
    let urls: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if urls.is_empty() {
        bail!("FEED_URLS contains no feed URLs");
    }
    Ok(urls)
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn set_required() {
        env::set_var("BOT_TOKEN", "123:abc");
        env::set_var("CHAT_ID", "@channel");
        env::set_var("FEED_URLS", "https://a.example/rss, https://b.example/rss,");
    }

    fn clear_all() {
        for key in [
            "BOT_TOKEN",
            "CHAT_ID",
            "FEED_URLS",
            "STATE_PATH",
            "MAX_ITEMS_PER_RUN",
            "MAX_ENTRIES_PER_FEED",
            "SEEN_LIMIT",
            "REQUEST_TIMEOUT_SECS",
            "SEND_DELAY_MS",
            "ONE_PER_SOURCE",
            "DISABLE_LINK_PREVIEW",
            "SUMMARY_MAX_CHARS",
            "USER_AGENT",
        ] {
            env::remove_var(key);
        }
    }

    #[serial_test::serial]
    #[test]
    fn resolves_with_defaults() {
        clear_all();
        set_required();

        let cfg = RunConfig::from_env().unwrap();
        assert_eq!(cfg.feed_urls.len(), 2);
        assert_eq!(cfg.state_path, PathBuf::from(DEFAULT_STATE_PATH));
        assert_eq!(cfg.max_items_per_run, 5);
        assert_eq!(cfg.seen_limit, 300);
        assert_eq!(cfg.send_delay, Duration::from_millis(1_200));
        assert!(cfg.one_per_source);
        assert!(!cfg.disable_link_preview);

        clear_all();
    }

    #[serial_test::serial]
    #[test]
    fn missing_required_var_is_fatal() {
        clear_all();
        env::set_var("BOT_TOKEN", "123:abc");
        env::set_var("CHAT_ID", "@channel");
        // FEED_URLS intentionally unset
        assert!(RunConfig::from_env().is_err());
        clear_all();
    }

    #[serial_test::serial]
    #[test]
    fn knobs_override_defaults() {
        clear_all();
        set_required();
        env::set_var("MAX_ITEMS_PER_RUN", "2");
        env::set_var("ONE_PER_SOURCE", "off");
        env::set_var("SEND_DELAY_MS", "50");

        let cfg = RunConfig::from_env().unwrap();
        assert_eq!(cfg.max_items_per_run, 2);
        assert!(!cfg.one_per_source);
        assert_eq!(cfg.send_delay, Duration::from_millis(50));

        clear_all();
    }

    #[test]
    fn feed_url_list_rejects_empty() {
        assert!(parse_feed_urls(" , ,").is_err());
        assert_eq!(
            parse_feed_urls("https://a.x/rss").unwrap(),
            vec!["https://a.x/rss".to_string()]
        );
    }
}
