// src/ingest/mod.rs
pub mod fetch;
pub mod parse;
pub mod types;

pub use fetch::HttpFeedFetcher;
pub use types::{CandidateItem, FeedFetcher, ParsedEntry, ParsedFeed};

use url::Url;

/// Label used when neither the feed nor its entries give us a name.
pub const FALLBACK_SOURCE_NAME: &str = "feed";

/// Fetch every configured source and merge the entries into one candidate
/// list. A failing source logs a warning and contributes zero items; it
/// never aborts the run. No cross-source ordering happens here.
pub async fn collect_candidates(
    fetcher: &dyn FeedFetcher,
    urls: &[String],
    max_entries_per_feed: usize,
) -> Vec<CandidateItem> {
    let mut out = Vec::new();
    for url in urls {
        match fetcher.fetch(url).await {
            Ok(feed) => {
                let source = resolve_source_name(&feed);
                let taken = feed.entries.len().min(max_entries_per_feed);
                tracing::debug!(url = %url, source = %source, entries = taken, "feed fetched");
                for entry in feed.entries.into_iter().take(max_entries_per_feed) {
                    out.push(to_candidate(source.clone(), entry));
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, url = %url, "feed fetch failed, skipping source");
            }
        }
    }
    out
}

/// Source label resolution: the feed's own title, else the host of the
/// first entry's link (lowercased, `www.` stripped), else a literal
/// fallback.
pub fn resolve_source_name(feed: &ParsedFeed) -> String {
    if let Some(title) = feed.title.as_deref() {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    feed.entries
        .first()
        .and_then(|e| e.link.as_deref())
        .and_then(host_label)
        .unwrap_or_else(|| FALLBACK_SOURCE_NAME.to_string())
}

fn host_label(link: &str) -> Option<String> {
    let host = Url::parse(link).ok()?.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn to_candidate(source: String, entry: ParsedEntry) -> CandidateItem {
    // Prefer the published stamp, fall back to updated, else 0.
    let published_at = entry.published.or(entry.updated).unwrap_or(0);
    CandidateItem {
        source,
        title: entry.title.unwrap_or_default(),
        summary: entry.summary.unwrap_or_default(),
        link: entry.link.unwrap_or_default(),
        published_at,
    }
}
