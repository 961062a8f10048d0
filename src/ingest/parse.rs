// src/ingest/parse.rs
//! Feed document parsing: RSS 2.0 and Atom via quick-xml's serde support.

use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::ingest::types::{ParsedEntry, ParsedFeed};

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

/// Atom text constructs may carry a `type` attribute, so a bare String
/// target won't do.
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

pub fn parse_rfc2822_to_unix(ts: &str) -> Option<u64> {
    let ts = ts.trim();
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .or_else(|| {
            // Obsolete zone names ("GMT", "UT") are everywhere in real feeds.
            let bare = ts.strip_suffix("GMT").or_else(|| ts.strip_suffix("UT"))?;
            OffsetDateTime::parse(&format!("{bare}+0000"), &Rfc2822).ok()
        })
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

pub fn parse_rfc3339_to_unix(ts: &str) -> Option<u64> {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

/// Real-world feeds leak HTML entities into element text, which is not
/// well-formed XML. Replace the usual suspects before handing the document
/// to the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn atom_text(t: Option<AtomText>) -> Option<String> {
    non_empty(t.and_then(|t| t.value))
}

/// Pick the entry link: prefer rel="alternate" (or no rel), fall back to
/// whatever link the entry has.
fn atom_entry_link(links: &[AtomLink]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.href.clone())
}

fn looks_like_atom(doc: &str) -> bool {
    let rss = doc.find("<rss");
    let atom = doc.find("<feed");
    match (rss, atom) {
        (Some(r), Some(a)) => a < r,
        (None, Some(_)) => true,
        _ => false,
    }
}

/// Parse one feed document, RSS 2.0 or Atom, into the common shape.
pub fn parse_feed(doc: &str) -> Result<ParsedFeed> {
    let clean = scrub_html_entities_for_xml(doc);
    if looks_like_atom(&clean) {
        parse_atom(&clean)
    } else {
        parse_rss(&clean)
    }
}

fn parse_rss(doc: &str) -> Result<ParsedFeed> {
    let rss: Rss = from_str(doc).context("parsing rss xml")?;
    let entries = rss
        .channel
        .items
        .into_iter()
        .map(|it| {
            let published = it.pub_date.as_deref().and_then(parse_rfc2822_to_unix);
            ParsedEntry {
                title: non_empty(it.title),
                link: non_empty(it.link),
                summary: non_empty(it.description),
                published,
                updated: None,
            }
        })
        .collect();
    Ok(ParsedFeed {
        title: non_empty(rss.channel.title),
        entries,
    })
}

fn parse_atom(doc: &str) -> Result<ParsedFeed> {
    let feed: AtomFeed = from_str(doc).context("parsing atom xml")?;
    let entries = feed
        .entries
        .into_iter()
        .map(|it| {
            let link = atom_entry_link(&it.links);
            let summary = atom_text(it.summary).or_else(|| atom_text(it.content));
            ParsedEntry {
                title: atom_text(it.title),
                link,
                summary,
                published: it.published.as_deref().and_then(parse_rfc3339_to_unix),
                updated: it.updated.as_deref().and_then(parse_rfc3339_to_unix),
            }
        })
        .collect();
    Ok(ParsedFeed {
        title: atom_text(feed.title),
        entries,
    })
}
