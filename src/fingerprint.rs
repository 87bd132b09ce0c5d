//! Page fingerprinting for the change monitor.
//!
//! Two interchangeable strategies, selected by configuration and never
//! combined in the same run:
//!
//! - **Digest**: SHA-256 over the whole body. Equality means "no change";
//!   any difference means "some change" with no detail on what changed.
//! - **Job-id set**: extract job identifiers from the HTML and diff the set
//!   against the previous run, producing descriptive added/removed lists.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

/// Primary extraction pattern: explicit `data-job-id` attributes.
static JOB_ID_PRIMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-job-id="([^"]+)""#).expect("valid pattern"));

/// Looser fallback used when the primary pattern finds nothing, e.g. when
/// the ids only appear in embedded JSON.
static JOB_ID_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)job[_-]id["\s:=]+([A-Za-z0-9_-]+)"#).expect("valid pattern"));

/// Compute the hex-encoded SHA-256 digest of a page body.
pub fn digest(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    let hash = hasher.finalize();
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Extract the set of job ids from a page body.
///
/// Tries the primary pattern first; if it yields zero matches, falls back
/// to the looser pattern. The result is de-duplicated, preserving first
/// occurrence order.
///
/// An empty result means the page structure probably changed or the page
/// failed to render, NOT that zero jobs are available — callers must treat
/// it as a scraping failure and skip the cycle.
pub fn extract_job_ids(html: &str) -> Vec<String> {
    let mut ids: Vec<String> = JOB_ID_PRIMARY
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .collect();

    if ids.is_empty() {
        ids = JOB_ID_FALLBACK
            .captures_iter(html)
            .map(|c| c[1].to_string())
            .collect();
    }

    dedup_preserving_order(ids)
}

/// The set difference between two job-id snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDiff {
    /// Ids present now but not in the previous snapshot.
    pub added: Vec<String>,
    /// Ids present previously but gone now.
    pub removed: Vec<String>,
}

impl JobDiff {
    /// True when nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute `added = new - old` and `removed = old - new`.
pub fn diff_jobs(old: &[String], new: &[String]) -> JobDiff {
    let added = new
        .iter()
        .filter(|id| !old.contains(id))
        .cloned()
        .collect();
    let removed = old
        .iter()
        .filter(|id| !new.contains(id))
        .cloned()
        .collect();
    JobDiff { added, removed }
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
