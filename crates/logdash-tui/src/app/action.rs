use crate::app::{DashboardTab, Screen};

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Navigate(Screen),
    Quit,
    ToggleHelp,

    // Form editing (login, register and dashboard text fields)
    FocusNext,
    FocusPrev,
    Input(char),
    Backspace,
    ClearInput,
    Submit,
    ToggleRole,

    // Dashboard
    SelectTab(DashboardTab),
    NextTab,
    PrevTab,
    Logout,
    StartEdit,
    FinishEdit,
    CancelEdit,

    // Upload tab
    Upload,
    CancelPoll,
    RefreshUploads,

    // Search tab
    RunSearch,
    ClearFilters,
    NextLevel,
    PrevLevel,
    NextSource,
    PrevSource,
    NextTimeRange,
    PrevTimeRange,
    NextPage,
    PrevPage,
    RowUp,
    RowDown,
    ToggleDetail,

    // Analytics tab
    LoadAnalytics,

    // Tick (for spinners)
    Tick,

    // Render request
    Render,
}
