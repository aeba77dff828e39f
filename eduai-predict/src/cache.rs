//! Last-result cache for aggregate statistics
//!
//! Holds the snapshot of the most recent successful batch so charts can be
//! redisplayed without recomputation. Writers replace the whole snapshot;
//! the last writer wins. Two concurrent uploads may leave a reader with a
//! snapshot from the other upload, which is accepted.

use std::sync::{Arc, PoisonError, RwLock};

use crate::stats::StatsSnapshot;

/// Shared, injectable cache handle. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct LastResultCache {
    slot: Arc<RwLock<Option<Arc<StatsSnapshot>>>>,
}

impl LastResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if any batch has completed
    pub fn current(&self) -> Option<Arc<StatsSnapshot>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the snapshot, returning the stored handle
    pub fn replace(&self, snapshot: StatsSnapshot) -> Arc<StatsSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::build_statistics;
    use uuid::Uuid;

    fn snapshot(score: f64) -> StatsSnapshot {
        let stats = build_statistics(&[score], &["Low".to_string()], &[0]).unwrap();
        StatsSnapshot::new(Uuid::new_v4(), stats)
    }

    #[test]
    fn test_starts_empty() {
        assert!(LastResultCache::new().current().is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = LastResultCache::new();
        cache.replace(snapshot(3.0));
        let second = cache.replace(snapshot(12.0));

        let current = cache.current().unwrap();
        assert_eq!(current.batch_id, second.batch_id);
        assert_eq!(current.stats.avg_score, 12.0);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let cache = LastResultCache::new();
        let handle = cache.clone();
        handle.replace(snapshot(7.0));
        assert_eq!(cache.current().unwrap().stats.avg_score, 7.0);
    }
}
