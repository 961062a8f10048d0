// src/normalize.rs
//! Turns a raw feed entry into its canonical display form and a stable
//! content fingerprint. Everything here is a pure function of its inputs.

use once_cell::sync::OnceCell;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::ingest::CandidateItem;

/// Display budget for rendered summaries, in characters.
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 280;

/// How much of the (cleaned) summary participates in the fingerprint.
/// Longer than the display budget so superficially re-truncated feeds
/// still hash the same.
const FINGERPRINT_SUMMARY_PREFIX: usize = 600;

/// Field separator for the canonical fingerprint string. U+001F never
/// survives HTML stripping, so it cannot collide with field content.
const FINGERPRINT_DELIM: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub published_at: u64,
    pub fingerprint: String,
}

impl NormalizedItem {
    /// An item with no title, no summary and no link carries nothing to
    /// identify or render; the planner drops it.
    pub fn has_content(&self) -> bool {
        !(self.title.is_empty() && self.summary.is_empty() && self.link.is_empty())
    }
}

/// Strip HTML markup: line-break tags become newlines first (so adjacent
/// words don't fuse), then tags are removed, entities decoded, and
/// whitespace runs collapsed to single spaces.
pub fn strip_html(s: &str) -> String {
    static RE_BREAKS: OnceCell<Regex> = OnceCell::new();
    let re_breaks = RE_BREAKS.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>").unwrap());
    let out = re_breaks.replace_all(s, "\n");

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let out = re_tags.replace_all(&out, "");

    let out = html_escape::decode_html_entities(&out).to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Cap `s` at `budget` characters; over budget, keep budget-1 and append
/// a single ellipsis. Counts chars, not bytes.
pub fn truncate_chars(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    let mut out: String = s.chars().take(budget.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Lowercase and collapse whitespace, the folding applied to every field
/// before hashing.
fn fold(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws
        .replace_all(s.to_lowercase().trim(), " ")
        .to_string()
}

/// Content fingerprint: SHA-256 over the folded fields joined in the fixed
/// order source, title, summary prefix, link. The join order is part of the
/// identity contract; changing it changes every fingerprint.
pub fn fingerprint(source: &str, title: &str, summary: &str, link: &str) -> String {
    let summary_prefix: String = fold(summary)
        .chars()
        .take(FINGERPRINT_SUMMARY_PREFIX)
        .collect();

    let mut canonical = fold(source);
    canonical.push(FINGERPRINT_DELIM);
    canonical.push_str(&fold(title));
    canonical.push(FINGERPRINT_DELIM);
    canonical.push_str(&summary_prefix);
    canonical.push(FINGERPRINT_DELIM);
    canonical.push_str(&fold(link));

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Normalize one candidate: clean the text fields, derive the fingerprint
/// from the cleaned (un-truncated) content, then apply the display budget.
pub fn normalize(item: &CandidateItem, summary_budget: usize) -> NormalizedItem {
    let title = strip_html(&item.title);
    let summary_full = strip_html(&item.summary);
    let link = item.link.trim().to_string();

    let fingerprint = fingerprint(&item.source, &title, &summary_full, &link);

    NormalizedItem {
        title,
        summary: truncate_chars(&summary_full, summary_budget),
        link,
        source: item.source.clone(),
        published_at: item.published_at,
        fingerprint,
    }
}
