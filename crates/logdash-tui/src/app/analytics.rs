use chrono::{DateTime, Local};

use logdash_types::{AnalyticsSnapshot, NamedCount};

pub const ANALYTICS_FAILED: &str = "Failed to load analytics";

/// State of the analytics tab
#[derive(Debug, Default)]
pub struct AnalyticsPanel {
    pub snapshot: Option<AnalyticsSnapshot>,
    pub busy: bool,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Local>>,
}

impl AnalyticsPanel {
    /// Mark a load as started; false if one is already running
    pub fn begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        self.error = None;
        true
    }

    pub fn apply(&mut self, snapshot: AnalyticsSnapshot, at: DateTime<Local>) {
        self.busy = false;
        self.error = None;
        self.snapshot = Some(snapshot);
        self.loaded_at = Some(at);
    }

    pub fn apply_error(&mut self, banner: String) {
        self.busy = false;
        self.error = Some(banner);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sum of all level counts
    pub fn total_events(&self) -> u64 {
        self.snapshot
            .as_ref()
            .map_or(0, |s| s.levels.iter().map(|c| c.value).sum())
    }

    /// Counts sorted largest first, at most `limit` entries
    pub fn ranked(counts: &[NamedCount], limit: usize) -> Vec<&NamedCount> {
        let mut ranked: Vec<&NamedCount> = counts.iter().collect();
        ranked.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(limit);
        ranked
    }
}
