//! Shared types for logdash
//!
//! This crate contains the data structures exchanged with the log-management
//! server and shared between the API client and the terminal UI.

use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Account Types
// ============================================================================

/// An authenticated user as reported by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    Role::Viewer.as_str().to_string()
}

impl User {
    /// Stand-in user when the server returns a token but no user record
    pub fn placeholder(username: &str) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            email: String::new(),
            role: default_role(),
        }
    }
}

/// Account role offered at registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Admin => "admin",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Viewer => Self::Admin,
            Self::Admin => Self::Viewer,
        }
    }
}

/// Payload for `POST /auth/register`
#[derive(Clone, Debug, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level as used by the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    #[default]
    Unknown,
}

/// Levels offered by the search filter, in display order
pub const LEVEL_CHOICES: [LogLevel; 4] = [
    LogLevel::Error,
    LogLevel::Warning,
    LogLevel::Info,
    LogLevel::Debug,
];

/// Sources offered by the search filter
pub const SOURCE_CHOICES: [&str; 4] = ["Apache", "Nginx", "System", "Application"];

impl LogLevel {
    /// Parse log level from common spellings
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "debug" | "dbg" | "trace" => Self::Debug,
            "info" | "inf" | "information" | "notice" => Self::Info,
            "warn" | "warning" | "wrn" => Self::Warning,
            "error" | "err" => Self::Error,
            "critical" | "crit" | "fatal" | "emerg" | "alert" => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Value sent in the `log_level` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Short display string (4 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DBG",
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERR",
            Self::Critical => "CRIT",
            Self::Unknown => "????",
        }
    }

    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Debug => Color::Cyan,
            Self::Info => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
            Self::Critical => Color::Magenta,
            Self::Unknown => Color::White,
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_param())
    }
}

/// A single ingested log record returned by the search endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub upload_id: Option<i64>,

    /// Event time (naive server timestamps are read as UTC)
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(rename = "log_level", alias = "level", default)]
    pub level: LogLevel,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub message: String,

    /// Parsed structured fields, if the ingester extracted any
    #[serde(default)]
    pub additional_fields: Option<Map<String, Value>>,
}

impl LogRecord {
    /// Compact one-line rendering of the structured fields
    pub fn fields_summary(&self) -> Option<String> {
        let fields = self.additional_fields.as_ref()?;
        if fields.is_empty() {
            return None;
        }
        serde_json::to_string(fields).ok()
    }

    /// Indented rendering of the structured fields
    pub fn fields_pretty(&self) -> Option<String> {
        let fields = self.additional_fields.as_ref()?;
        serde_json::to_string_pretty(fields).ok()
    }
}

/// Lenient timestamp parsing for server payloads
pub mod timestamp {
    use super::*;

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];

    /// Parse an RFC 3339 or naive ISO 8601 timestamp (naive = UTC)
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// Format a timestamp the way the server expects query parameters
    pub fn to_param(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

// ============================================================================
// Upload Types
// ============================================================================

/// Server-side ingestion state of an upload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Pending,
    #[default]
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl UploadState {
    /// Whether polling should stop at this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Response of `POST /uploads/` and entries of `GET /uploads/`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadReceipt {
    #[serde(alias = "upload_id")]
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: UploadState,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub upload_timestamp: Option<DateTime<Utc>>,
}

/// Response of `GET /uploads/{id}/status`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadStatus {
    pub status: UploadState,
}

// ============================================================================
// Search Types
// ============================================================================

/// Time window for log searches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// No time bounds
    #[default]
    All,
    Last15m,
    Last1h,
    Last6h,
    Last24h,
    Last7d,
}

impl TimeRange {
    /// Window length, `None` for unbounded
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::All => None,
            Self::Last15m => Some(Duration::minutes(15)),
            Self::Last1h => Some(Duration::hours(1)),
            Self::Last6h => Some(Duration::hours(6)),
            Self::Last24h => Some(Duration::hours(24)),
            Self::Last7d => Some(Duration::days(7)),
        }
    }

    /// Start and end of the window ending at `now`
    pub fn bounds(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.as_duration().map(|d| (now - d, now))
    }

    /// Get display label for this time range
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All time",
            Self::Last15m => "15m",
            Self::Last1h => "1h",
            Self::Last6h => "6h",
            Self::Last24h => "24h",
            Self::Last7d => "7d",
        }
    }

    /// Cycle to the next time range
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Last15m,
            Self::Last15m => Self::Last1h,
            Self::Last1h => Self::Last6h,
            Self::Last6h => Self::Last24h,
            Self::Last24h => Self::Last7d,
            Self::Last7d => Self::All,
        }
    }

    /// Cycle to the previous time range
    pub fn prev(&self) -> Self {
        match self {
            Self::All => Self::Last7d,
            Self::Last15m => Self::All,
            Self::Last1h => Self::Last15m,
            Self::Last6h => Self::Last1h,
            Self::Last24h => Self::Last6h,
            Self::Last7d => Self::Last24h,
        }
    }
}

/// Parameters of `GET /search/`
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub log_level: Option<LogLevel>,
    pub source: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: None,
            log_level: None,
            source: None,
            start_time: None,
            end_time: None,
            page: 1,
            per_page: 50,
        }
    }
}

impl SearchQuery {
    /// True when no filter narrows the search
    pub fn is_unfiltered(&self) -> bool {
        self.q.is_none()
            && self.log_level.is_none()
            && self.source.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }

    /// Query string pairs; absent filters are omitted
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(q) = &self.q {
            params.push(("q", q.clone()));
        }
        if let Some(level) = &self.log_level {
            params.push(("log_level", level.as_param().to_string()));
        }
        if let Some(source) = &self.source {
            params.push(("source", source.clone()));
        }
        if let Some(start) = &self.start_time {
            params.push(("start_time", timestamp::to_param(start)));
        }
        if let Some(end) = &self.end_time {
            params.push(("end_time", timestamp::to_param(end)));
        }
        params.push(("page", self.page.to_string()));
        params.push(("per_page", self.per_page.to_string()));
        params
    }
}

/// One page of search results
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub logs: Vec<LogRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl SearchPage {
    /// Number of pages, derived from `total` when the server omits it
    pub fn page_count(&self) -> u32 {
        if let Some(pages) = self.total_pages {
            return pages;
        }
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page)) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

// ============================================================================
// Analytics Types
// ============================================================================

/// Bucket size for `/analytics/time-series`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnalyticsInterval {
    Minute,
    #[default]
    Hour,
    Day,
}

impl AnalyticsInterval {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

/// Grouping field for `/analytics/distribution`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DistributionField {
    #[default]
    LogLevel,
    Source,
}

impl DistributionField {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::LogLevel => "log_level",
            Self::Source => "source",
        }
    }
}

/// Analytics responses are wrapped in a `series` array
#[derive(Clone, Debug, Deserialize)]
pub struct SeriesEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub series: Vec<T>,
}

/// A named data series (time-series responses)
#[derive(Clone, Debug, Deserialize)]
pub struct NamedSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<TimeSeriesPoint>,
}

/// One bucket of the event-count time series
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub x: Option<DateTime<Utc>>,
    #[serde(default)]
    pub y: u64,
}

/// A label with a count (distributions, top errors)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NamedCount {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default)]
    pub value: u64,
}

/// Group labels can be null on the server side
fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_else(|| "(none)".to_string()))
}

/// Everything shown on the analytics tab
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalyticsSnapshot {
    pub levels: Vec<NamedCount>,
    pub sources: Vec<NamedCount>,
    pub top_errors: Vec<NamedCount>,
    pub hourly: Vec<TimeSeriesPoint>,
}

impl AnalyticsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
            && self.sources.is_empty()
            && self.top_errors.is_empty()
            && self.hourly.is_empty()
    }
}

/// Expand a leading `~/` against the home directory
pub fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
