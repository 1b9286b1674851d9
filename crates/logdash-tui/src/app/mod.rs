//! Application state and actions

mod action;
mod analytics;
mod forms;
mod search;
mod state;
mod upload;

pub use action::Action;
pub use analytics::{ANALYTICS_FAILED, AnalyticsPanel};
pub use forms::{LoginField, LoginForm, RegisterField, RegisterForm, TextField};
pub use search::{NO_RESULTS, SEARCH_FAILED, SearchPanel, VALIDATION_MESSAGE};
pub use state::{AppState, AuthRequest, DashboardTab, Screen, UiState};
pub use upload::{UPLOAD_FAILED, UploadPanel, UploadPhase};
