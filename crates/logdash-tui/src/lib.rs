//! TUI components for logdash
//!
//! This crate provides the terminal user interface for logdash,
//! including state management, keybindings, event handling, and UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{
    Action, AnalyticsPanel, AppState, AuthRequest, DashboardTab, LoginForm, RegisterForm, Screen, SearchPanel,
    TextField, UiState, UploadPanel, UploadPhase,
};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{Banner, HelpOverlay, StatusBar, TextInput};
pub use ui::screens::{DashboardScreen, LoginScreen, RegisterScreen};
pub use ui::{Layout, Theme};
