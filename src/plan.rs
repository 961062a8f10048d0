// src/plan.rs
//! Decides what gets sent this run, and in what order.

use std::collections::HashSet;

use crate::normalize::NormalizedItem;
use crate::state::SeenSet;

#[derive(Debug, Clone, Copy)]
pub struct PlanLimits {
    /// Absolute cap on items dispatched per run.
    pub max_items: usize,
    /// At most one accepted item per source per run.
    pub one_per_source: bool,
}

/// Build the ordered dispatch plan: oldest first by best-effort timestamp
/// (missing stamps sort as 0, ties keep input order via stable sort), then
/// one filtering walk. Nothing here mutates the seen-set; commit timing
/// belongs to the run controller.
pub fn plan(
    mut candidates: Vec<NormalizedItem>,
    seen: &SeenSet,
    limits: &PlanLimits,
) -> Vec<NormalizedItem> {
    candidates.sort_by_key(|item| item.published_at);

    let mut accepted = Vec::new();
    let mut pending: HashSet<String> = HashSet::new();
    let mut used_sources: HashSet<String> = HashSet::new();

    for item in candidates {
        if accepted.len() >= limits.max_items {
            break;
        }
        if !item.has_content() {
            continue;
        }
        if seen.contains(&item.fingerprint) || pending.contains(&item.fingerprint) {
            continue;
        }
        if limits.one_per_source && used_sources.contains(&item.source) {
            continue;
        }
        pending.insert(item.fingerprint.clone());
        used_sources.insert(item.source.clone());
        accepted.push(item);
    }
    accepted
}
