use chrono::{DateTime, Utc};
use ratatui::widgets::TableState;

use logdash_types::{LEVEL_CHOICES, LogLevel, LogRecord, SOURCE_CHOICES, SearchPage, SearchQuery, TimeRange};

use super::TextField;

pub const SEARCH_FAILED: &str = "Search failed";
pub const VALIDATION_MESSAGE: &str = "Please enter a search term or select a filter";
pub const NO_RESULTS: &str = "No logs found. Try adjusting your search criteria.";

/// State of the search tab
#[derive(Debug)]
pub struct SearchPanel {
    pub query: TextField,
    pub level: Option<LogLevel>,
    pub source: Option<&'static str>,
    pub time_range: TimeRange,
    pub per_page: u32,

    /// Last page received; `None` until the first search
    pub results: Option<SearchPage>,
    /// Query that produced (or is producing) `results`
    pub last_query: Option<SearchQuery>,
    /// Validation or request error banner
    pub error: Option<String>,
    /// A search request is in flight
    pub busy: bool,

    pub table_state: TableState,
    pub detail_visible: bool,
}

impl SearchPanel {
    pub fn new(per_page: u32) -> Self {
        Self {
            query: TextField::new(),
            level: None,
            source: None,
            time_range: TimeRange::All,
            per_page: per_page.max(1),
            results: None,
            last_query: None,
            error: None,
            busy: false,
            table_state: TableState::default(),
            detail_visible: false,
        }
    }

    pub fn next_level(&mut self) {
        self.level = cycle(&LEVEL_CHOICES, self.level, 1);
    }

    pub fn prev_level(&mut self) {
        self.level = cycle(&LEVEL_CHOICES, self.level, -1);
    }

    pub fn next_source(&mut self) {
        self.source = cycle(&SOURCE_CHOICES, self.source, 1);
    }

    pub fn prev_source(&mut self) {
        self.source = cycle(&SOURCE_CHOICES, self.source, -1);
    }

    pub fn next_time_range(&mut self) {
        self.time_range = self.time_range.next();
    }

    pub fn prev_time_range(&mut self) {
        self.time_range = self.time_range.prev();
    }

    /// Build the first-page query from the form, resolving the time range
    /// against `now`. Fails when every filter is empty.
    pub fn build_query(&self, now: DateTime<Utc>) -> Result<SearchQuery, String> {
        let q = self.query.value().trim();
        let bounds = self.time_range.bounds(now);

        let query = SearchQuery {
            q: (!q.is_empty()).then(|| q.to_string()),
            log_level: self.level,
            source: self.source.map(str::to_string),
            start_time: bounds.map(|(start, _)| start),
            end_time: bounds.map(|(_, end)| end),
            page: 1,
            per_page: self.per_page,
        };

        if query.is_unfiltered() {
            return Err(VALIDATION_MESSAGE.to_string());
        }
        Ok(query)
    }

    /// Start a new search from the form.
    ///
    /// Returns the query to send, or `None` when a search is already running
    /// or validation failed (the error is set).
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<SearchQuery> {
        if self.busy {
            return None;
        }
        match self.build_query(now) {
            Ok(query) => Some(self.begin(query)),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    /// Query for the page `delta` away from the current one, if it exists
    pub fn page_query(&mut self, delta: i32) -> Option<SearchQuery> {
        if self.busy {
            return None;
        }
        let results = self.results.as_ref()?;
        let mut query = self.last_query.clone()?;

        let target = i64::from(results.page) + i64::from(delta);
        if target < 1 || target > i64::from(results.page_count()) {
            return None;
        }
        query.page = target as u32;
        Some(self.begin(query))
    }

    fn begin(&mut self, query: SearchQuery) -> SearchQuery {
        self.busy = true;
        self.error = None;
        self.last_query = Some(query.clone());
        query
    }

    pub fn apply_results(&mut self, page: SearchPage) {
        self.busy = false;
        self.error = None;
        let selected = if page.logs.is_empty() { None } else { Some(0) };
        self.table_state.select(selected);
        self.results = Some(page);
    }

    pub fn apply_error(&mut self, banner: String) {
        self.busy = false;
        self.error = Some(banner);
    }

    /// Reset every filter and drop the results.
    /// A search already in flight stays in flight.
    pub fn clear(&mut self) {
        let in_flight = self.busy.then(|| self.last_query.take());
        *self = Self::new(self.per_page);
        if let Some(last_query) = in_flight {
            self.busy = true;
            self.last_query = last_query;
        }
    }

    pub fn records(&self) -> &[LogRecord] {
        self.results.as_ref().map(|r| r.logs.as_slice()).unwrap_or_default()
    }

    pub fn selected_record(&self) -> Option<&LogRecord> {
        self.records().get(self.table_state.selected()?)
    }

    pub fn row_up(&mut self) {
        if self.records().is_empty() {
            return;
        }
        let i = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(i));
    }

    pub fn row_down(&mut self) {
        let len = self.records().len();
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| (i + 1).min(len - 1));
        self.table_state.select(Some(i));
    }

    pub fn toggle_detail(&mut self) {
        self.detail_visible = !self.detail_visible;
    }

    /// "Page 2 of 5 · 230 results"
    pub fn page_summary(&self) -> Option<String> {
        let results = self.results.as_ref()?;
        let pages = results.page_count().max(1);
        Some(format!(
            "Page {} of {} · {} results",
            results.page, pages, results.total
        ))
    }
}

/// Step through `None` followed by each choice, wrapping around
fn cycle<T: Copy + PartialEq>(choices: &[T], current: Option<T>, step: isize) -> Option<T> {
    let slots = choices.len() as isize + 1;
    let index = match current {
        None => 0,
        Some(value) => choices
            .iter()
            .position(|c| *c == value)
            .map_or(0, |i| i as isize + 1),
    };
    let next = (index + step).rem_euclid(slots);
    if next == 0 {
        None
    } else {
        Some(choices[next as usize - 1])
    }
}
