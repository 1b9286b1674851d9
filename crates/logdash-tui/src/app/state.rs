use tokio::sync::mpsc;

use logdash_types::User;

use super::{Action, AnalyticsPanel, LoginForm, RegisterForm, SearchPanel, TextField, UploadPanel};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Screen enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
}

/// Tabs of the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    Upload,
    Search,
    Analytics,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Upload,
        DashboardTab::Search,
        DashboardTab::Analytics,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Search => "Search",
            Self::Analytics => "Analytics",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Search => 1,
            Self::Analytics => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Kind of sign-in request in flight
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthRequest {
    SignIn,
    SignUp,
}

impl AuthRequest {
    /// Spinner text while the request runs
    pub fn label(&self) -> &'static str {
        match self {
            Self::SignIn => "Signing in...",
            Self::SignUp => "Creating account...",
        }
    }
}

/// UI-specific transient state
#[derive(Debug, Default)]
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Is a dashboard text field capturing keys?
    pub editing: bool,

    /// Ticks since start, drives the spinner
    pub tick: u64,
}

/// Global application state
pub struct AppState {
    /// Current screen being displayed
    pub current_screen: Screen,

    /// Signed-in user; `None` means the dashboard is off limits
    pub user: Option<User>,

    /// Server base URL, shown in headers
    pub server: String,

    /// Banner of the login and register screens
    pub auth_error: Option<String>,

    /// Login or registration in flight; shared so only one runs at a time
    pub auth_pending: Option<AuthRequest>,

    pub login: LoginForm,
    pub register: RegisterForm,

    pub tab: DashboardTab,
    pub upload: UploadPanel,
    pub search: SearchPanel,
    pub analytics: AnalyticsPanel,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Channel sender for follow-up actions
    pub action_tx: mpsc::UnboundedSender<Action>,

    /// Bumped on every sign-out so late responses can be dropped
    pub session_epoch: u64,
}

impl AppState {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, server: String, per_page: u32) -> Self {
        Self {
            current_screen: Screen::Login,
            user: None,
            server,
            auth_error: None,
            auth_pending: None,
            login: LoginForm::default(),
            register: RegisterForm::default(),
            tab: DashboardTab::default(),
            upload: UploadPanel::default(),
            search: SearchPanel::new(per_page),
            analytics: AnalyticsPanel::default(),
            ui_state: UiState::default(),
            should_quit: false,
            action_tx,
            session_epoch: 0,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Switch screens. The dashboard requires a signed-in user and redirects
    /// to the login screen otherwise.
    pub fn navigate_to(&mut self, screen: Screen) {
        let screen = if screen == Screen::Dashboard && !self.is_authenticated() {
            Screen::Login
        } else {
            screen
        };

        if screen != self.current_screen {
            // A banner belongs to the screen that raised it
            self.auth_error = None;
        }
        self.current_screen = screen;
        self.ui_state.editing = false;
        self.ui_state.help_visible = false;
    }

    /// Mark a login or registration as started.
    /// Returns false if one is already running.
    pub fn begin_auth(&mut self, request: AuthRequest) -> bool {
        if self.auth_pending.is_some() {
            return false;
        }
        self.auth_pending = Some(request);
        self.auth_error = None;
        true
    }

    pub fn finish_auth(&mut self) {
        self.auth_pending = None;
    }

    /// Enter the dashboard as `user`
    pub fn sign_in(&mut self, user: User) {
        self.user = Some(user);
        self.auth_pending = None;
        self.login.reset();
        self.register.reset();
        self.tab = DashboardTab::Upload;
        self.navigate_to(Screen::Dashboard);
    }

    /// Drop everything tied to the signed-in user and return to login
    pub fn sign_out(&mut self) {
        self.user = None;
        self.auth_pending = None;
        self.session_epoch = self.session_epoch.wrapping_add(1);
        self.upload.reset();
        self.search.clear();
        self.analytics.reset();
        self.login.reset();
        self.register.reset();
        self.navigate_to(Screen::Login);
    }

    pub fn select_tab(&mut self, tab: DashboardTab) {
        self.tab = tab;
        self.ui_state.editing = false;
    }

    /// Start editing the text field of the current tab, if it has one
    pub fn start_edit(&mut self) -> bool {
        let editable = self.current_screen == Screen::Dashboard
            && matches!(self.tab, DashboardTab::Upload | DashboardTab::Search);
        self.ui_state.editing = editable;
        editable
    }

    /// The text field receiving typed characters on the dashboard
    pub fn editing_field_mut(&mut self) -> Option<&mut TextField> {
        if !self.ui_state.editing || self.current_screen != Screen::Dashboard {
            return None;
        }
        match self.tab {
            DashboardTab::Upload => Some(&mut self.upload.path),
            DashboardTab::Search => Some(&mut self.search.query),
            DashboardTab::Analytics => None,
        }
    }

    pub fn tick(&mut self) {
        self.ui_state.tick = self.ui_state.tick.wrapping_add(1);
    }

    /// Current spinner frame
    pub fn spinner(&self) -> char {
        SPINNER[(self.ui_state.tick % SPINNER.len() as u64) as usize]
    }
}
