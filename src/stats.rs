//! Per-user usage counters.
//!
//! An in-memory map keyed by sender identifier, owned by the server state
//! and injected into handlers. Counters are best effort: they reset on
//! restart and an idle-TTL plus entry-cap eviction policy bounds memory
//! growth, so an entry for a long-idle user may be dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::model::MediaKind;

/// Maximum number of tracked senders before eviction kicks in.
const MAX_ENTRIES: usize = 10_000;

/// Entries idle longer than this are eligible for eviction.
const IDLE_TTL_DAYS: i64 = 30;

/// Counters for one sender.
#[derive(Debug, Clone)]
pub struct UserStats {
    pub message_count: u64,
    pub images_analyzed: u64,
    pub videos_analyzed: u64,
    pub ai_detected_count: u64,
    /// When this sender first messaged the bot.
    pub join_date: DateTime<Utc>,
    /// Last activity, used by the eviction policy.
    pub last_active: DateTime<Utc>,
}

impl UserStats {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            message_count: 0,
            images_analyzed: 0,
            videos_analyzed: 0,
            ai_detected_count: 0,
            join_date: now,
            last_active: now,
        }
    }

    /// AI detections as a percentage of analyzed media.
    pub fn ai_detection_rate(&self) -> u64 {
        let analyzed = self.images_analyzed + self.videos_analyzed;
        if analyzed == 0 {
            0
        } else {
            self.ai_detected_count * 100 / analyzed
        }
    }
}

/// Shared store of per-sender statistics.
#[derive(Clone, Default)]
pub struct StatsStore {
    inner: Arc<Mutex<HashMap<String, UserStats>>>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an inbound message from `sender`, creating the entry on first
    /// contact.
    pub fn record_message(&self, sender: &str) {
        self.record_message_at(sender, Utc::now());
    }

    fn record_message_at(&self, sender: &str, now: DateTime<Utc>) {
        let mut map = self.inner.lock().expect("stats lock poisoned");
        let stats = map
            .entry(sender.to_string())
            .or_insert_with(|| UserStats::new(now));
        stats.message_count += 1;
        stats.last_active = now;

        if map.len() > MAX_ENTRIES {
            evict(&mut map, now);
        }
    }

    /// Count a completed analysis for `sender`.
    pub fn record_analysis(&self, sender: &str, kind: MediaKind, is_ai: bool) {
        let mut map = self.inner.lock().expect("stats lock poisoned");
        let Some(stats) = map.get_mut(sender) else {
            return;
        };
        match kind {
            MediaKind::Image => stats.images_analyzed += 1,
            MediaKind::Video => stats.videos_analyzed += 1,
        }
        if is_ai {
            stats.ai_detected_count += 1;
        }
    }

    /// A snapshot of one sender's counters.
    pub fn get(&self, sender: &str) -> Option<UserStats> {
        self.inner
            .lock()
            .expect("stats lock poisoned")
            .get(sender)
            .cloned()
    }

    /// Number of senders currently tracked.
    pub fn user_count(&self) -> usize {
        self.inner.lock().expect("stats lock poisoned").len()
    }
}

/// Drop idle entries; if everything is live, drop the least recently
/// active until back under the cap.
fn evict(map: &mut HashMap<String, UserStats>, now: DateTime<Utc>) {
    let cutoff = now - Duration::days(IDLE_TTL_DAYS);
    let before = map.len();
    map.retain(|_, stats| stats.last_active >= cutoff);

    while map.len() > MAX_ENTRIES {
        let Some(oldest) = map
            .iter()
            .min_by_key(|(_, stats)| stats.last_active)
            .map(|(sender, _)| sender.clone())
        else {
            break;
        };
        map.remove(&oldest);
    }

    debug!(evicted = before - map.len(), "stats eviction pass");
}
