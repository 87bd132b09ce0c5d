//! The page-change monitor.
//!
//! One timer drives check cycles that never overlap: fetch the target page,
//! fingerprint it, compare against the persisted state, and notify the
//! admin over Twilio when something changed. A cycle that fails is reported
//! through the same channel and the timer continues uninterrupted.
//!
//! # Notification throttle
//!
//! Per cycle the monitor is in one of three states — no baseline, unchanged,
//! changed — with an overlapping daily-summary latch keyed by UTC date:
//!
//! - First successful run persists the fingerprint and sends a "monitoring
//!   started" notification. Not a change.
//! - Unchanged cycles send nothing, except that the first cycle inside the
//!   configured summary hour on a day without changes sends a single
//!   "no changes today" summary.
//! - A change persists the new fingerprint, records today as the last
//!   change date, and marks the summary as sent: a real change notification
//!   always preempts the "no news" summary for that day.
//! - Cycles outside the summary hour reset the latch so the next day's
//!   window can fire again.

use chrono::{DateTime, Timelike, Utc};
use tracing::{error, info, warn};

use crate::config::{FingerprintStrategy, MonitorConfig};
use crate::error::FetchError;
use crate::fingerprint::{self, JobDiff};
use crate::messaging::TwilioClient;
use crate::storage::{MonitorStore, SummaryState};

/// Timeout for a single page fetch.
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

/// User-Agent sent with page fetches.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; VigilMonitor/1.0)";

/// What one comparison against the persisted fingerprint concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// First successful run; the fingerprint was persisted as baseline.
    Baseline { notification: String },
    /// Fingerprint matches the stored value.
    Unchanged,
    /// Fingerprint differs; the new value was persisted.
    Changed { notification: String },
}

/// Evaluate a digest-strategy cycle.
pub fn evaluate_digest(previous: Option<&str>, current: &str, url: &str) -> CycleOutcome {
    match previous {
        None => CycleOutcome::Baseline {
            notification: format!("Page monitor started. Watching {url}"),
        },
        Some(prev) if prev == current => CycleOutcome::Unchanged,
        Some(_) => CycleOutcome::Changed {
            notification: format!("Page content changed:\n\n{url}"),
        },
    }
}

/// Evaluate a job-id-strategy cycle.
///
/// The caller must have already rejected an empty `current` set as a
/// scraping failure.
pub fn evaluate_jobs(previous: Option<&[String]>, current: &[String], url: &str) -> CycleOutcome {
    match previous {
        None => CycleOutcome::Baseline {
            notification: format!(
                "Job monitor started. Tracking {} jobs.\n\n{url}",
                current.len()
            ),
        },
        Some(prev) => {
            let diff = fingerprint::diff_jobs(prev, current);
            if diff.is_empty() {
                CycleOutcome::Unchanged
            } else {
                CycleOutcome::Changed {
                    notification: change_message(&diff, current.len(), url),
                }
            }
        }
    }
}

/// Build the descriptive change notification for the job-id strategy.
fn change_message(diff: &JobDiff, total: usize, url: &str) -> String {
    let mut message = String::from("Jobs update:\n\n");
    if !diff.added.is_empty() {
        message.push_str(&format!("✅ {} new job(s) posted\n", diff.added.len()));
    }
    if !diff.removed.is_empty() {
        message.push_str(&format!("❌ {} job(s) removed\n", diff.removed.len()));
    }
    message.push_str(&format!("\nTotal jobs: {total}\n\n{url}"));
    message
}

/// Record a detected change in the daily-summary state.
///
/// Marking the summary as sent suppresses the "no news" message for the
/// rest of the day.
pub fn record_change(state: &mut SummaryState, now: DateTime<Utc>) {
    state.last_change_date = Some(now.date_naive());
    state.daily_message_sent = true;
}

/// Advance the daily-summary latch for an unchanged cycle.
///
/// Returns true when a "no changes today" summary should be sent now.
/// At most one summary fires per UTC day, and none on a day that already
/// saw a change notification.
pub fn summary_due(state: &mut SummaryState, now: DateTime<Utc>, summary_hour: u32) -> bool {
    if now.hour() == summary_hour {
        if state.last_change_date != Some(now.date_naive()) && !state.daily_message_sent {
            state.daily_message_sent = true;
            return true;
        }
        false
    } else {
        // The latch only lives inside the summary-hour window
        state.daily_message_sent = false;
        false
    }
}

/// Best-effort notification channel: Twilio when configured, logs always.
#[derive(Clone)]
pub struct Notifier {
    twilio: Option<TwilioClient>,
    admin: Option<String>,
}

impl Notifier {
    pub fn new(twilio: Option<TwilioClient>, admin: Option<String>) -> Self {
        Self { twilio, admin }
    }

    /// A notifier that only logs, for tests and degraded configurations.
    pub fn log_only() -> Self {
        Self {
            twilio: None,
            admin: None,
        }
    }

    /// Send a notification to the admin. Delivery failures are logged and
    /// swallowed; a lost notification never fails the cycle.
    pub async fn notify(&self, message: &str) {
        info!(%message, "monitor notification");
        let (Some(twilio), Some(admin)) = (&self.twilio, &self.admin) else {
            return;
        };
        let to = if admin.starts_with("whatsapp:") {
            admin.clone()
        } else {
            format!("whatsapp:{admin}")
        };
        if let Err(e) = twilio.send(&to, message).await {
            error!(error = %e, "failed to deliver monitor notification");
        }
    }
}

/// The monitor itself: config, HTTP client, state store, notifier.
pub struct Monitor {
    config: MonitorConfig,
    client: reqwest::Client,
    store: MonitorStore,
    notifier: Notifier,
}

impl Monitor {
    /// Build a monitor from its configuration, opening the state directory
    /// and constructing the Twilio client when credentials are present.
    pub fn new(config: MonitorConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        let store = MonitorStore::new(&config.state_dir)?;
        let twilio = config.twilio.as_ref().map(TwilioClient::new);
        let notifier = Notifier::new(twilio, config.admin_number.clone());

        Ok(Self {
            config,
            client,
            store,
            notifier,
        })
    }

    /// Run the check loop forever. Cycles are awaited to completion before
    /// the next tick; a failing cycle is reported and the loop continues.
    pub async fn run(&self) {
        let period = std::time::Duration::from_secs(self.config.interval_minutes * 60);
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            url = %self.config.url,
            interval_minutes = self.config.interval_minutes,
            strategy = ?self.config.strategy,
            "monitor started"
        );

        loop {
            timer.tick().await;
            if let Err(e) = self.run_cycle(Utc::now()).await {
                error!(error = %e, "monitor cycle failed");
                self.notifier
                    .notify(&format!("⚠️ Monitor error: {e}"))
                    .await;
            }
        }
    }

    /// Execute one check cycle at the given instant.
    ///
    /// Returns the notifications that were sent, which is what the
    /// integration tests assert on.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        let body = self.fetch_page().await?;

        let outcome = match self.config.strategy {
            FingerprintStrategy::Digest => {
                let current = fingerprint::digest(&body);
                let outcome = evaluate_digest(
                    self.store.load_digest().as_deref(),
                    &current,
                    &self.config.url,
                );
                if !matches!(outcome, CycleOutcome::Unchanged) {
                    self.store.save_digest(&current)?;
                }
                outcome
            }
            FingerprintStrategy::Jobs => {
                let html = String::from_utf8_lossy(&body);
                let current = fingerprint::extract_job_ids(&html);
                if current.is_empty() {
                    // Probable scraping failure, not an empty job board:
                    // leave state untouched and try again next cycle.
                    warn!(url = %self.config.url, "no job ids extracted, skipping cycle");
                    return Ok(Vec::new());
                }
                let previous = self.store.load_jobs();
                let outcome = evaluate_jobs(
                    previous.as_ref().map(|s| s.jobs.as_slice()),
                    &current,
                    &self.config.url,
                );
                if !matches!(outcome, CycleOutcome::Unchanged) {
                    self.store.save_jobs(&current)?;
                }
                outcome
            }
        };

        let mut notifications = Vec::new();
        let loaded = self.store.load_summary();
        let mut summary = loaded.clone();

        match outcome {
            CycleOutcome::Baseline { notification } => {
                info!("first run, baseline persisted");
                notifications.push(notification);
            }
            CycleOutcome::Changed { notification } => {
                info!("change detected");
                record_change(&mut summary, now);
                notifications.push(notification);
            }
            CycleOutcome::Unchanged => {
                info!("no changes detected");
                if summary_due(&mut summary, now, self.config.summary_hour) {
                    notifications.push(format!(
                        "No changes today.\n\n{}",
                        self.config.url
                    ));
                }
            }
        }

        if summary != loaded {
            self.store.save_summary(&summary)?;
        }

        for message in &notifications {
            self.notifier.notify(message).await;
        }
        Ok(notifications)
    }

    async fn fetch_page(&self) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(&self.config.url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
