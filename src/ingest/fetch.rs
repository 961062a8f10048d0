// src/ingest/fetch.rs
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::ingest::parse::parse_feed;
use crate::ingest::types::{FeedFetcher, ParsedFeed};

/// Production fetcher: HTTP GET with the configured identification string
/// and per-request timeout, then XML parsing.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting feed {url}"))?
            .error_for_status()
            .with_context(|| format!("feed {url} returned non-2xx"))?
            .text()
            .await
            .with_context(|| format!("reading feed body from {url}"))?;
        parse_feed(&body)
    }
}
