//! Same-day SMS deduplication cache.
//!
//! Maps `{phone}_{user}` to the last send instant and blocks a second send
//! on the same UTC calendar day. This is a daily rate limit, not a
//! distributed dedup: state lives in memory and is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// Entries older than this are swept after each write.
const EVICT_AFTER_DAYS: i64 = 3;

/// Shared (phone, user) → last-sent cache with a reader/writer lock.
#[derive(Clone, Default)]
pub struct DedupCache {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(phone: &str, user_id: &str) -> String {
        format!("{}_{}", phone, user_id)
    }

    /// True if no SMS has been sent to this (phone, user) pair today.
    pub async fn should_send(&self, phone: &str, user_id: &str) -> bool {
        self.should_send_at(phone, user_id, Utc::now()).await
    }

    /// Clock-injectable variant of [`should_send`](Self::should_send).
    pub async fn should_send_at(&self, phone: &str, user_id: &str, now: DateTime<Utc>) -> bool {
        let entries = self.entries.read().await;
        let Some(&sent_at) = entries.get(&Self::key(phone, user_id)) else {
            return true;
        };

        if sent_at.date_naive() < now.date_naive() {
            log::info!(
                "✅ New day - SMS allowed (phone={}, user_id={}, last_sent={})",
                phone,
                user_id,
                sent_at.format("%Y-%m-%d %H:%M:%S")
            );
            return true;
        }

        log::warn!(
            "🚫 SMS blocked - already sent today (phone={}, user_id={}, last_sent={})",
            phone,
            user_id,
            sent_at.format("%Y-%m-%d %H:%M:%S")
        );
        false
    }

    /// Records a successful send and kicks off an async eviction sweep.
    pub async fn mark_sent(&self, phone: &str, user_id: &str) {
        self.mark_sent_at(phone, user_id, Utc::now()).await;

        let cache = self.clone();
        tokio::spawn(async move {
            cache.evict_older_than(Utc::now() - Duration::days(EVICT_AFTER_DAYS)).await;
        });
    }

    /// Clock-injectable upsert without the background sweep (used by tests).
    pub async fn mark_sent_at(&self, phone: &str, user_id: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.insert(Self::key(phone, user_id), now);
        log::info!("📝 SMS cache updated (phone={}, user_id={})", phone, user_id);
    }

    /// Removes entries sent before `cutoff`. Takes the exclusive lock.
    pub async fn evict_older_than(&self, cutoff: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, sent_at| *sent_at >= cutoff);
        let removed = before - entries.len();

        if removed > 0 {
            log::info!(
                "🧹 Dedup cache cleanup: removed {} entries, {} remaining",
                removed,
                entries.len()
            );
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
