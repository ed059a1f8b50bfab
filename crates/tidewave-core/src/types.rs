//! Common types used throughout Tidewave

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Internal page variant the UI renders for the current URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PageVariant {
    #[default]
    NewTab,
    SearchResults,
    External,
}

/// Colour theme of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Side panels; at most one is visible at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Bookmarks,
    History,
    Downloads,
}

/// Saved bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: i64,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: unique_id("bm"),
            title: title.into(),
            url: url.into(),
            created_at: now_millis(),
        }
    }
}

/// Entry of the visited-history log (not the back/forward stack)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Downloading,
    Completed,
    /// Reserved; the simulated flow never fails on its own.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadKind {
    Video,
    File,
}

/// Simulated download entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItem {
    pub id: u64,
    pub filename: String,
    /// Percent complete, 0..=100
    pub progress: u8,
    pub status: DownloadStatus,
    /// Display string such as "12.4 MB"
    pub size: String,
    #[serde(rename = "type")]
    pub kind: DownloadKind,
    pub started_at: i64,
}

impl DownloadItem {
    pub fn is_active(&self) -> bool {
        self.status == DownloadStatus::Downloading
    }
}

/// Ad-block counters and switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdBlockStats {
    pub enabled: bool,
    pub strict_mode: bool,
    pub total_blocked: u64,
    pub session_blocked: u64,
}

impl Default for AdBlockStats {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_mode: false,
            total_blocked: 0,
            session_blocked: 0,
        }
    }
}

/// Mock search result, derived from the query alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub is_ad: bool,
}

/// Simulated throughput for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSample {
    pub down_bytes_per_sec: u64,
    pub up_bytes_per_sec: u64,
}

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate an id that is unique within this process, e.g. `bm-1700000000000-3`
pub fn unique_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, now_millis(), n)
}
