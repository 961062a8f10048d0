// src/runner.rs
//! One full run: load state, aggregate, plan, dispatch, commit once.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::ingest::{self, FeedFetcher};
use crate::normalize;
use crate::notify::Notifier;
use crate::plan::{self, PlanLimits};
use crate::state::SeenSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub candidates: usize,
    pub planned: usize,
    pub sent: usize,
    /// True when a dispatch failure cut the run short. Unsent items were
    /// never marked seen and stay eligible next run.
    pub halted: bool,
}

pub async fn run_once(
    cfg: &RunConfig,
    fetcher: &dyn FeedFetcher,
    notifier: &dyn Notifier,
) -> Result<RunReport> {
    let mut seen = SeenSet::load(&cfg.state_path, cfg.seen_limit).await;

    let candidates =
        ingest::collect_candidates(fetcher, &cfg.feed_urls, cfg.max_entries_per_feed).await;
    if candidates.is_empty() {
        // Nothing fetched anywhere; leave the state file untouched.
        info!("no candidates from any source, nothing to do");
        return Ok(RunReport::default());
    }

    let normalized: Vec<_> = candidates
        .iter()
        .map(|c| normalize::normalize(c, cfg.summary_max_chars))
        .collect();
    let planned = plan::plan(
        normalized,
        &seen,
        &PlanLimits {
            max_items: cfg.max_items_per_run,
            one_per_source: cfg.one_per_source,
        },
    );

    let mut delivered: Vec<String> = Vec::new();
    let mut halted = false;
    for (i, item) in planned.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(cfg.send_delay).await;
        }
        match notifier.send(item).await {
            Ok(()) => delivered.push(item.fingerprint.clone()),
            Err(e) => {
                // Stop here; the delivered prefix still gets committed.
                warn!(error = ?e, title = %item.title, "dispatch failed, halting run");
                halted = true;
                break;
            }
        }
    }

    let report = RunReport {
        candidates: candidates.len(),
        planned: planned.len(),
        sent: delivered.len(),
        halted,
    };

    seen.extend(delivered);
    seen.save(&cfg.state_path).await?;

    info!(
        candidates = report.candidates,
        planned = report.planned,
        sent = report.sent,
        halted = report.halted,
        seen = seen.len(),
        "run complete"
    );
    Ok(report)
}
