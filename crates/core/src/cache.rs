//! Resume signal cache.
//!
//! Keyed by resume content hash (see [`crate::resume::resume_key`]),
//! read-mostly, shared across sessions for the life of the process.
//! There is no eviction: the map is bounded by the number of distinct
//! resumes uploaded.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::resume::ResumeSignals;

#[derive(Default)]
pub struct ResumeCache {
    entries: RwLock<HashMap<String, Arc<ResumeSignals>>>,
}

impl ResumeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<ResumeSignals>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Stores signals for a key, first write wins.
    ///
    /// If two callers race to parse the same resume, both parses succeed but
    /// only the first stored value is ever observed; the loser gets the
    /// winner's `Arc` back. Values are never torn: the `Arc` swap happens
    /// under the write lock.
    pub async fn put(&self, key: impl Into<String>, signals: ResumeSignals) -> Arc<ResumeSignals> {
        let mut entries = self.entries.write().await;
        entries
            .entry(key.into())
            .or_insert_with(|| Arc::new(signals))
            .clone()
    }

    /// Drops the entry for a key, e.g. when a user uploads a new resume.
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(marker: &str) -> ResumeSignals {
        ResumeSignals {
            raw_text: marker.to_string(),
            skills: vec!["Rust".to_string()],
            experience_fragments: vec![],
            education_fragments: vec![],
            project_fragments: vec![],
        }
    }

    #[tokio::test]
    async fn round_trip_returns_equal_signals() {
        let cache = ResumeCache::new();
        let stored = signals("v1");

        cache.put("key", stored.clone()).await;
        let loaded = cache.get("key").await.expect("entry present");

        assert_eq!(*loaded, stored);
    }

    #[tokio::test]
    async fn first_write_wins() {
        let cache = ResumeCache::new();

        let first = cache.put("key", signals("first")).await;
        let second = cache.put("key", signals("second")).await;

        assert_eq!(first.raw_text, "first");
        assert_eq!(second.raw_text, "first");
        assert_eq!(cache.get("key").await.unwrap().raw_text, "first");
    }

    #[tokio::test]
    async fn invalidate_removes_the_entry() {
        let cache = ResumeCache::new();
        cache.put("key", signals("v1")).await;

        cache.invalidate("key").await;

        assert!(cache.get("key").await.is_none());
        // And a new upload for the same key can be stored again.
        cache.put("key", signals("v2")).await;
        assert_eq!(cache.get("key").await.unwrap().raw_text, "v2");
    }
}
