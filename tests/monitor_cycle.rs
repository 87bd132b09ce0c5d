//! Integration tests for the change monitor against a local page server.
//!
//! A tiny axum server plays the careers page; its content is swapped
//! between cycles to drive the notification state machine. The monitor
//! runs log-only (no Twilio credentials), so `run_cycle` returning the
//! notifications it produced is what the assertions work on.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{Router, routing::get};
use chrono::{DateTime, TimeZone, Utc};

use vigil::config::{FingerprintStrategy, MonitorConfig};
use vigil::monitor::Monitor;

/// Serve `content` on a random local port, returning the page URL.
async fn spawn_page_server(content: Arc<Mutex<String>>) -> String {
    let app = Router::new().route(
        "/careers",
        get(move || {
            let content = content.clone();
            async move { content.lock().unwrap().clone() }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/careers")
}

fn monitor_for(url: String, state_dir: &Path, strategy: FingerprintStrategy) -> Monitor {
    let config = MonitorConfig {
        url,
        interval_minutes: 30,
        state_dir: state_dir.to_path_buf(),
        strategy,
        summary_hour: 20,
        twilio: None,
        admin_number: None,
    };
    Monitor::new(config).unwrap()
}

/// A cycle instant comfortably outside the summary-hour window.
fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
}

fn in_summary_hour() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 20, 0, 0).unwrap()
}

#[tokio::test]
async fn test_jobs_monitor_three_run_scenario() {
    let content = Arc::new(Mutex::new(
        r#"<div data-job-id="a"></div><div data-job-id="b"></div>"#.to_string(),
    ));
    let url = spawn_page_server(content.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let monitor = monitor_for(url, dir.path(), FingerprintStrategy::Jobs);

    // Run 1: no cache, sends only the init notification
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("Job monitor started"));
    assert!(notifications[0].contains("Tracking 2 jobs"));

    // Run 2: unchanged, sends nothing
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert!(notifications.is_empty());

    // Run 3: one job added, one removed
    *content.lock().unwrap() =
        r#"<div data-job-id="a"></div><div data-job-id="c"></div>"#.to_string();
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("1 new job(s) posted"));
    assert!(notifications[0].contains("1 job(s) removed"));
    assert!(notifications[0].contains("Total jobs: 2"));
}

#[tokio::test]
async fn test_digest_monitor_three_run_scenario() {
    let content = Arc::new(Mutex::new("content X".to_string()));
    let url = spawn_page_server(content.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let monitor = monitor_for(url, dir.path(), FingerprintStrategy::Digest);

    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("Page monitor started"));

    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert!(notifications.is_empty());

    *content.lock().unwrap() = "content Y".to_string();
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("Page content changed"));
}

#[tokio::test]
async fn test_daily_summary_sent_once() {
    let content = Arc::new(Mutex::new(r#"<div data-job-id="a"></div>"#.to_string()));
    let url = spawn_page_server(content).await;
    let dir = tempfile::tempdir().unwrap();
    let monitor = monitor_for(url, dir.path(), FingerprintStrategy::Jobs);

    // Establish the baseline in the morning
    monitor.run_cycle(morning()).await.unwrap();

    // First unchanged cycle inside the window sends the summary
    let notifications = monitor.run_cycle(in_summary_hour()).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("No changes today"));

    // Second cycle inside the same window stays quiet
    let notifications = monitor.run_cycle(in_summary_hour()).await.unwrap();
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_summary_suppressed_on_change_day() {
    let content = Arc::new(Mutex::new(r#"<div data-job-id="a"></div>"#.to_string()));
    let url = spawn_page_server(content.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let monitor = monitor_for(url, dir.path(), FingerprintStrategy::Jobs);

    monitor.run_cycle(morning()).await.unwrap();

    // A real change earlier in the day...
    *content.lock().unwrap() =
        r#"<div data-job-id="a"></div><div data-job-id="b"></div>"#.to_string();
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert_eq!(notifications.len(), 1);

    // ...preempts the evening summary
    let notifications = monitor.run_cycle(in_summary_hour()).await.unwrap();
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_scrape_failure_leaves_state_untouched() {
    let content = Arc::new(Mutex::new("<html>maintenance page</html>".to_string()));
    let url = spawn_page_server(content.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let monitor = monitor_for(url, dir.path(), FingerprintStrategy::Jobs);

    // Zero extracted ids: no notification, no baseline written
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert!(notifications.is_empty());

    // Once the page renders again this is still the first run
    *content.lock().unwrap() = r#"<div data-job-id="a"></div>"#.to_string();
    let notifications = monitor.run_cycle(morning()).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("Job monitor started"));
}

#[tokio::test]
async fn test_fetch_failure_surfaces_as_error() {
    let content = Arc::new(Mutex::new(String::new()));
    let url = spawn_page_server(content).await;
    let dir = tempfile::tempdir().unwrap();
    // Point at a path the page server does not route: 404
    let monitor = monitor_for(
        url.replace("/careers", "/missing"),
        dir.path(),
        FingerprintStrategy::Digest,
    );

    let result = monitor.run_cycle(morning()).await;
    assert!(result.is_err());
}
