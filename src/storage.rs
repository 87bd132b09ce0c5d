//! Flat-file persistence for the change monitor.
//!
//! Three unversioned files live under the configured state directory:
//!
//! - `page.sha256` — previous digest, single line of lowercase hex
//!   (digest strategy).
//! - `jobs.json` — `{ "jobs": [...], "timestamp": ... }` (job-id strategy).
//! - `summary.json` — daily-summary latch state.
//!
//! Reads never fail: an absent, unreadable or malformed file is logged and
//! treated as "no prior state", which the monitor interprets as a first
//! run. Only writes surface errors.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

const DIGEST_FILE: &str = "page.sha256";
const JOBS_FILE: &str = "jobs.json";
const SUMMARY_FILE: &str = "summary.json";

/// Persisted job-id snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Job ids seen on the most recent successful fetch.
    pub jobs: Vec<String>,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Persisted daily-summary state.
///
/// Tracked independently of fingerprint changes; see the throttle state
/// machine in [`crate::monitor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryState {
    /// UTC date of the last detected content change, if any.
    pub last_change_date: Option<NaiveDate>,
    /// Whether today's summary window has already produced a message
    /// (or been preempted by a change notification).
    pub daily_message_sent: bool,
}

/// Handle to the monitor's state directory.
#[derive(Debug, Clone)]
pub struct MonitorStore {
    dir: PathBuf,
}

impl MonitorStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Load the previous page digest, if one was persisted.
    pub fn load_digest(&self) -> Option<String> {
        let path = self.dir.join(DIGEST_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let digest = contents.trim().to_string();
                if digest.is_empty() { None } else { Some(digest) }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "digest file unreadable, treating as first run");
                None
            }
        }
    }

    /// Persist the current page digest.
    pub fn save_digest(&self, digest: &str) -> anyhow::Result<()> {
        fs::write(self.dir.join(DIGEST_FILE), format!("{digest}\n"))?;
        Ok(())
    }

    /// Load the previous job snapshot, if one was persisted and parses.
    pub fn load_jobs(&self) -> Option<JobSnapshot> {
        read_json(&self.dir.join(JOBS_FILE))
    }

    /// Persist the current job-id set with a fresh timestamp.
    pub fn save_jobs(&self, jobs: &[String]) -> anyhow::Result<()> {
        let snapshot = JobSnapshot {
            jobs: jobs.to_vec(),
            timestamp: Utc::now(),
        };
        write_json(&self.dir.join(JOBS_FILE), &snapshot)
    }

    /// Load the daily-summary state, defaulting when absent or malformed.
    pub fn load_summary(&self) -> SummaryState {
        read_json(&self.dir.join(SUMMARY_FILE)).unwrap_or_default()
    }

    /// Persist the daily-summary state.
    pub fn save_summary(&self, state: &SummaryState) -> anyhow::Result<()> {
        write_json(&self.dir.join(SUMMARY_FILE), state)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "state file unreadable, treating as no prior state");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "state file malformed, treating as no prior state");
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
