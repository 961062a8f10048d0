// src/state.rs
//! The persisted seen-set: an ordered, bounded list of fingerprints for
//! items already delivered in past runs.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// On-disk shape: a single record with the ordered fingerprint list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SeenFile {
    #[serde(default)]
    seen: Vec<String>,
}

#[derive(Debug)]
pub struct SeenSet {
    entries: Vec<String>,
    index: HashSet<String>,
    limit: usize,
}

impl SeenSet {
    pub fn empty(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: HashSet::new(),
            limit,
        }
    }

    /// Load from disk. Missing or corrupt state is an empty set, never an
    /// error; the worst outcome is one round of re-delivery.
    pub async fn load(path: &Path, limit: usize) -> Self {
        let file: SeenFile = match fs::read_to_string(path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, path = %path.display(), "corrupt state, starting empty");
                SeenFile::default()
            }),
            Err(_) => SeenFile::default(),
        };
        let mut set = Self::empty(limit);
        set.extend(file.seen);
        set
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.index.contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append fingerprints in delivery order, then evict from the front
    /// until the bound holds. Oldest entries go first.
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, fingerprints: I) {
        for fp in fingerprints {
            if self.index.insert(fp.clone()) {
                self.entries.push(fp);
            }
        }
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            for evicted in self.entries.drain(0..excess) {
                self.index.remove(&evicted);
            }
        }
    }

    /// Persist once, at the end of a run. The parent directory is created
    /// on demand so a fresh deployment works from an empty tree.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("creating state dir {}", dir.display()))?;
            }
        }
        let file = SeenFile {
            seen: self.entries.clone(),
        };
        let body = serde_json::to_vec_pretty(&file).context("encoding state")?;
        fs::write(path, body)
            .await
            .with_context(|| format!("writing state to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = SeenSet::load(&dir.path().join("absent.json"), 10).await;
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let set = SeenSet::load(&path, 10).await;
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state.json");

        let mut set = SeenSet::empty(10);
        set.extend(["a".to_string(), "b".to_string(), "c".to_string()]);
        set.save(&path).await.unwrap();

        let loaded = SeenSet::load(&path, 10).await;
        assert_eq!(loaded.len(), 3);
        assert!(loaded.contains("a") && loaded.contains("b") && loaded.contains("c"));
        assert_eq!(loaded.entries, vec!["a", "b", "c"]);
    }

    #[test]
    fn eviction_drops_oldest_first() {
        let mut set = SeenSet::empty(3);
        set.extend((0..5).map(|i| format!("fp{i}")));
        assert_eq!(set.len(), 3);
        assert!(!set.contains("fp0"));
        assert!(!set.contains("fp1"));
        assert!(set.contains("fp2") && set.contains("fp3") && set.contains("fp4"));
    }

    #[test]
    fn duplicate_fingerprints_are_not_double_counted() {
        let mut set = SeenSet::empty(10);
        set.extend(["x".to_string(), "x".to_string()]);
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn shrunken_limit_keeps_most_recent_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut set = SeenSet::empty(10);
        set.extend((0..6).map(|i| format!("fp{i}")));
        set.save(&path).await.unwrap();

        let loaded = SeenSet::load(&path, 4).await;
        assert_eq!(loaded.len(), 4);
        assert!(!loaded.contains("fp0"));
        assert!(loaded.contains("fp5"));
    }
}
