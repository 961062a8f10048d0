// src/ingest/types.rs
use anyhow::Result;

/// One feed document after parsing, before any per-run policy is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// The feed's self-declared title, when it has one.
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

/// One entry as the feed declared it. Optional fields are resolved here,
/// once, instead of being probed repeatedly downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    /// Unix seconds; `None` when absent or unparseable.
    pub published: Option<u64>,
    pub updated: Option<u64>,
}

/// One entry tagged with its resolved source label, ready for
/// normalization. Missing fields have collapsed to empty strings and the
/// best-effort timestamp to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub source: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Unix seconds, 0 when the feed gave us nothing usable. Ordering
    /// only, never filtering.
    pub published_at: u64,
}

/// Seam to the feed-fetching collaborator. Production uses HTTP + XML
/// parsing; tests substitute fixtures.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed>;
}
