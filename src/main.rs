mod config;
mod logging;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tokio::sync::mpsc;

use logdash_api::{
    AnalyticsSnapshot, ApiClient, ApiError, AuthOutcome, ClientConfig, PollEvent, PollSettings,
    SearchPage, SearchQuery, Session, TokenStore, UploadPoller, UploadReceipt, sign_in, sign_up,
};
use logdash_tui::app::{ANALYTICS_FAILED, SEARCH_FAILED, UPLOAD_FAILED};
use logdash_tui::{
    Action, AppState, AuthRequest, DashboardScreen, DashboardTab, Event, EventHandler, HelpOverlay,
    KeyBindings, KeyContext, LoginScreen, RegisterScreen, Screen, Tui,
};

use crate::config::AppConfig;

/// Recent uploads shown on the upload tab
const RECENT_UPLOADS: u32 = 20;

/// logdash - upload, search and explore logs on a log-management server
#[derive(Parser, Debug)]
#[command(name = "logdash")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server base URL
    #[arg(long, env = "LOGDASH_SERVER", value_name = "URL")]
    server: Option<String>,

    /// Config file (default: <config dir>/logdash/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where the sign-in token is stored (default: ~/.logdash/session.json)
    #[arg(long, value_name = "PATH")]
    session_file: Option<PathBuf>,

    /// Search results per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(config::MAX_PER_PAGE)))]
    per_page: Option<u32>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Log file (default: ~/.logdash/logdash.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, warnings) = resolve_config(&args)?;

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(logging::default_log_path);
    logging::init(args.debug, config.log_level.as_deref(), &log_path)?;
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    // Run the application
    let result = run_app(config).await;

    // Handle any errors
    if let Err(e) = &result {
        tracing::error!("exiting with error: {e:#}");
        eprintln!("Error: {:#}", e);
    }

    result
}

/// Config file values overridden by command-line arguments
fn resolve_config(args: &Args) -> Result<(AppConfig, Vec<String>)> {
    let (mut config, warnings) = match &args.config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            config::load_config(path)
        }
        None => match config::default_path() {
            Some(path) => config::load_config(&path),
            None => (AppConfig::default(), Vec::new()),
        },
    };

    if let Some(server) = &args.server {
        config.base_url = config::validate_base_url(server)
            .map_err(|e| anyhow::anyhow!("--server {e}"))?;
    }
    if let Some(path) = &args.session_file {
        config.session_file = Some(path.clone());
    }
    if let Some(per_page) = args.per_page {
        config.per_page = per_page;
    }
    if let Some(path) = &args.log_file {
        config.log_file = Some(path.clone());
    }

    Ok((config, warnings))
}

/// Results of background requests, applied on the event loop
enum InternalAction {
    Auth(AuthOutcome),
    UploadAccepted(Result<UploadReceipt, ApiError>),
    UploadsListed(Result<Vec<UploadReceipt>, ApiError>),
    SearchFinished(Result<SearchPage, ApiError>),
    AnalyticsLoaded(Result<AnalyticsSnapshot, ApiError>),
}

/// Everything the handlers need besides the UI state
struct Backend {
    session: Session,
    poller: UploadPoller,
    /// Request results tagged with the session epoch they were issued in
    internal_tx: mpsc::UnboundedSender<(u64, InternalAction)>,
    poll_tx: mpsc::UnboundedSender<PollEvent>,
}

impl Backend {
    /// Run `request` on a background task with the current client
    fn spawn<F, Fut>(&self, epoch: u64, request: F)
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = InternalAction> + Send + 'static,
    {
        let pending = request(self.session.client().clone());
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send((epoch, pending.await));
        });
    }
}

async fn run_app(config: AppConfig) -> Result<()> {
    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<(u64, InternalAction)>();
    let (poll_tx, mut poll_rx) = mpsc::unbounded_channel::<PollEvent>();

    let client = ApiClient::new(&ClientConfig {
        base_url: config.base_url.clone(),
        timeout: config.timeout,
        connect_timeout: config.connect_timeout,
    })
    .context("creating HTTP client")?;
    let store = TokenStore::new(
        config
            .session_file
            .clone()
            .unwrap_or_else(TokenStore::default_path),
    );

    let mut backend = Backend {
        session: Session::restore(client, store),
        poller: UploadPoller::new(PollSettings {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        }),
        internal_tx,
        poll_tx,
    };
    tracing::info!(
        server = %config.base_url,
        resumed = backend.session.is_authenticated(),
        "starting"
    );

    // Initialize state
    let mut state = AppState::new(action_tx.clone(), config.base_url.clone(), config.per_page);

    // A stored session goes straight to the dashboard
    if backend.session.is_authenticated() {
        if let Some(user) = backend.session.user().cloned() {
            state.sign_in(user);
            refresh_uploads(&mut state, &backend);
        }
    }

    // Initialize TUI
    let mut tui = Tui::new().context("initializing terminal")?;

    // Initialize event handler
    let mut events = EventHandler::new(Duration::from_millis(100));

    // Initialize keybindings
    let keybindings = KeyBindings::new();

    // Initial render
    render(&mut tui, &mut state)?;

    // Main event loop
    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.help_visible {
                            keybindings.get_help_action(&key)
                        } else {
                            match state.current_screen {
                                Screen::Login => keybindings.get_form_action(KeyContext::LoginForm, &key),
                                Screen::Register => keybindings.get_form_action(KeyContext::RegisterForm, &key),
                                Screen::Dashboard if state.ui_state.editing => {
                                    keybindings.get_text_input_action(&key)
                                }
                                Screen::Dashboard => {
                                    keybindings.get_action(KeyContext::for_tab(state.tab), &key)
                                }
                            }
                        };

                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Paste(text) => {
                        handle_paste(&mut state, &text);
                    }
                    Event::Tick => {
                        let _ = action_tx.send(Action::Tick);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        tracing::warn!(error = %e, "terminal event error");
                    }
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &mut backend, action);
            }

            // Handle finished requests
            Some((epoch, internal)) = internal_rx.recv() => {
                dispatch_internal(&mut state, &mut backend, epoch, internal);
            }

            // Handle upload status updates
            Some(event) = poll_rx.recv() => {
                handle_poll_event(&mut state, &mut backend, event);
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    backend.poller.stop();
    events.shutdown();
    tui.restore()?;
    tracing::info!("exited");

    Ok(())
}

fn handle_action(state: &mut AppState, backend: &mut Backend, action: Action) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::Navigate(screen) => {
            backend.session.clear_error();
            state.navigate_to(screen);
        }
        Action::Tick => {
            state.tick();
        }
        Action::Render => {}

        // Forms and text fields
        Action::FocusNext => match state.current_screen {
            Screen::Login => state.login.focus_next(),
            Screen::Register => state.register.focus_next(),
            Screen::Dashboard => {}
        },
        Action::FocusPrev => match state.current_screen {
            Screen::Login => state.login.focus_prev(),
            Screen::Register => state.register.focus_prev(),
            Screen::Dashboard => {}
        },
        Action::Input(c) => {
            if let Some(field) = state.editing_field_mut() {
                field.push(c);
            } else {
                match state.current_screen {
                    Screen::Login => state.login.input(c),
                    Screen::Register => state.register.input(c),
                    Screen::Dashboard => {}
                }
            }
        }
        Action::Backspace => {
            if let Some(field) = state.editing_field_mut() {
                field.pop();
            } else {
                match state.current_screen {
                    Screen::Login => state.login.backspace(),
                    Screen::Register => state.register.backspace(),
                    Screen::Dashboard => {}
                }
            }
        }
        Action::ClearInput => {
            if let Some(field) = state.editing_field_mut() {
                field.clear();
            } else {
                match state.current_screen {
                    Screen::Login => state.login.clear_field(),
                    Screen::Register => state.register.clear_field(),
                    Screen::Dashboard => {}
                }
            }
        }
        Action::ToggleRole => {
            state.register.toggle_role();
        }
        Action::Submit => match state.current_screen {
            Screen::Login => submit_login(state, backend),
            Screen::Register => submit_register(state, backend),
            Screen::Dashboard => {}
        },

        // Dashboard
        Action::SelectTab(tab) => {
            state.select_tab(tab);
        }
        Action::NextTab => {
            state.select_tab(state.tab.next());
        }
        Action::PrevTab => {
            state.select_tab(state.tab.prev());
        }
        Action::Logout => {
            backend.poller.stop();
            backend.session.logout();
            state.sign_out();
        }
        Action::StartEdit => {
            state.start_edit();
        }
        Action::FinishEdit => {
            state.ui_state.editing = false;
            // Enter in the search box runs the search
            if state.tab == DashboardTab::Search {
                run_search(state, backend);
            }
        }
        Action::CancelEdit => {
            state.ui_state.editing = false;
        }

        // Upload tab
        Action::Upload => {
            start_upload(state, backend);
        }
        Action::CancelPoll => {
            if state.upload.cancel() {
                backend.poller.stop();
                tracing::info!("stopped waiting for upload processing");
            }
        }
        Action::RefreshUploads => {
            refresh_uploads(state, backend);
        }

        // Search tab
        Action::RunSearch => {
            run_search(state, backend);
        }
        Action::ClearFilters => {
            state.search.clear();
        }
        Action::NextLevel => state.search.next_level(),
        Action::PrevLevel => state.search.prev_level(),
        Action::NextSource => state.search.next_source(),
        Action::PrevSource => state.search.prev_source(),
        Action::NextTimeRange => state.search.next_time_range(),
        Action::PrevTimeRange => state.search.prev_time_range(),
        Action::NextPage => {
            let query = state.search.page_query(1);
            send_search(state, backend, query);
        }
        Action::PrevPage => {
            let query = state.search.page_query(-1);
            send_search(state, backend, query);
        }
        Action::RowUp => match state.tab {
            DashboardTab::Upload => state.upload.recent_up(),
            DashboardTab::Search => state.search.row_up(),
            DashboardTab::Analytics => {}
        },
        Action::RowDown => match state.tab {
            DashboardTab::Upload => state.upload.recent_down(),
            DashboardTab::Search => state.search.row_down(),
            DashboardTab::Analytics => {}
        },
        Action::ToggleDetail => {
            state.search.toggle_detail();
        }

        // Analytics tab
        Action::LoadAnalytics => {
            if state.analytics.begin() {
                backend.spawn(state.session_epoch, |client| async move {
                    InternalAction::AnalyticsLoaded(client.analytics_snapshot(Utc::now()).await)
                });
            }
        }
    }
}

/// Pasted text goes to whichever field has focus
fn handle_paste(state: &mut AppState, text: &str) {
    let text = text.trim_end_matches(['\r', '\n']);
    if let Some(field) = state.editing_field_mut() {
        text.chars().for_each(|c| field.push(c));
        return;
    }
    match state.current_screen {
        Screen::Login => text.chars().for_each(|c| state.login.input(c)),
        Screen::Register => text.chars().for_each(|c| state.register.input(c)),
        Screen::Dashboard if state.tab == DashboardTab::Upload => {
            // Dropping a file onto the terminal fills in the path
            state.upload.path.set(text.trim());
        }
        Screen::Dashboard => {}
    }
}

fn submit_login(state: &mut AppState, backend: &mut Backend) {
    if state.auth_pending.is_some() {
        return;
    }
    let (username, password) = match state.login.credentials() {
        Ok(credentials) => credentials,
        Err(message) => {
            state.auth_error = Some(message);
            return;
        }
    };

    state.begin_auth(AuthRequest::SignIn);
    backend.session.begin_attempt();
    tracing::debug!(%username, "signing in");
    backend.spawn(state.session_epoch, |client| async move {
        InternalAction::Auth(sign_in(&client, &username, &password).await)
    });
}

fn submit_register(state: &mut AppState, backend: &mut Backend) {
    if state.auth_pending.is_some() {
        return;
    }
    let account = match state.register.account() {
        Ok(account) => account,
        Err(message) => {
            state.auth_error = Some(message);
            return;
        }
    };

    state.begin_auth(AuthRequest::SignUp);
    backend.session.begin_attempt();
    tracing::debug!(username = %account.username, role = account.role.as_str(), "registering");
    backend.spawn(state.session_epoch, |client| async move {
        InternalAction::Auth(sign_up(&client, &account).await)
    });
}

fn start_upload(state: &mut AppState, backend: &mut Backend) {
    let Some(path) = state.upload.begin() else {
        return;
    };
    // A new upload replaces whatever was being watched
    backend.poller.stop();
    tracing::info!(path = %path.display(), "uploading log file");
    backend.spawn(state.session_epoch, |client| async move {
        InternalAction::UploadAccepted(client.upload_log(&path).await)
    });
}

fn refresh_uploads(state: &mut AppState, backend: &Backend) {
    if state.upload.loading_recent {
        return;
    }
    state.upload.loading_recent = true;
    backend.spawn(state.session_epoch, |client| async move {
        InternalAction::UploadsListed(client.list_uploads(RECENT_UPLOADS).await)
    });
}

fn run_search(state: &mut AppState, backend: &mut Backend) {
    let query = state.search.submit(Utc::now());
    send_search(state, backend, query);
}

fn send_search(state: &mut AppState, backend: &mut Backend, query: Option<SearchQuery>) {
    let Some(query) = query else {
        return;
    };
    tracing::debug!(page = query.page, per_page = query.per_page, "searching");
    backend.spawn(state.session_epoch, |client| async move {
        InternalAction::SearchFinished(client.search(&query).await)
    });
}

/// Sign out when the server no longer accepts the token.
/// Returns true if the session was expired.
fn expire_if_unauthorized(state: &mut AppState, backend: &mut Backend, error: &ApiError) -> bool {
    if !error.is_unauthorized() {
        return false;
    }
    tracing::warn!(error = %error, "session rejected by server");
    backend.poller.stop();
    backend.session.expire();
    state.sign_out();
    state.auth_error = backend.session.error().map(str::to_string);
    true
}

/// Apply a finished request unless it belongs to an earlier session
fn dispatch_internal(
    state: &mut AppState,
    backend: &mut Backend,
    epoch: u64,
    internal: InternalAction,
) {
    if epoch == state.session_epoch {
        handle_internal(state, backend, internal);
    } else {
        tracing::debug!(epoch, current = state.session_epoch, "dropping response from an earlier session");
    }
}

fn handle_internal(state: &mut AppState, backend: &mut Backend, internal: InternalAction) {
    match internal {
        InternalAction::Auth(outcome) => {
            state.finish_auth();
            match backend.session.apply(outcome) {
                Ok(()) => {
                    if let Some(user) = backend.session.user().cloned() {
                        state.sign_in(user);
                        refresh_uploads(state, backend);
                    }
                }
                Err(_) => {
                    state.auth_error = backend.session.error().map(str::to_string);
                }
            }
        }

        InternalAction::UploadAccepted(result) => match result {
            Ok(receipt) => {
                tracing::info!(upload_id = receipt.id, "upload accepted");
                state.upload.accepted(&receipt);
                backend.poller.start(
                    backend.session.client().clone(),
                    receipt.id,
                    backend.poll_tx.clone(),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                if !expire_if_unauthorized(state, backend, &e) {
                    state.upload.upload_failed(&e.banner(UPLOAD_FAILED));
                }
            }
        },

        InternalAction::UploadsListed(result) => match result {
            Ok(uploads) => {
                state.upload.set_recent(uploads);
            }
            Err(e) => {
                state.upload.loading_recent = false;
                tracing::warn!(error = %e, "listing uploads failed");
                expire_if_unauthorized(state, backend, &e);
            }
        },

        InternalAction::SearchFinished(result) => match result {
            Ok(page) => {
                tracing::debug!(total = page.total, rows = page.logs.len(), "search finished");
                state.search.apply_results(page);
            }
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                if !expire_if_unauthorized(state, backend, &e) {
                    state.search.apply_error(e.banner(SEARCH_FAILED));
                }
            }
        },

        InternalAction::AnalyticsLoaded(result) => match result {
            Ok(snapshot) => {
                state.analytics.apply(snapshot, Local::now());
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading analytics failed");
                if !expire_if_unauthorized(state, backend, &e) {
                    state.analytics.apply_error(e.banner(ANALYTICS_FAILED));
                }
            }
        },
    }
}

fn handle_poll_event(state: &mut AppState, backend: &mut Backend, event: PollEvent) {
    let watched = state.upload.polling_id();
    match event {
        PollEvent::Status {
            upload_id,
            state: upload_state,
            attempt,
        } if watched == Some(upload_id) => {
            tracing::debug!(upload_id, status = upload_state.label(), attempt, "upload still processing");
            state.upload.status_checked(attempt);
        }
        PollEvent::Finished {
            upload_id,
            state: upload_state,
        } if watched == Some(upload_id) => {
            tracing::info!(upload_id, status = upload_state.label(), "upload processed");
            state.upload.finished(upload_state);
            refresh_uploads(state, backend);
        }
        PollEvent::Failed { upload_id, error } if watched == Some(upload_id) => {
            tracing::warn!(upload_id, error = %error, "upload status check failed");
            if !expire_if_unauthorized(state, backend, &error) {
                state.upload.status_failed();
            }
        }
        PollEvent::GaveUp { upload_id, attempts } if watched == Some(upload_id) => {
            tracing::warn!(upload_id, attempts, "gave up waiting for upload processing");
            state.upload.gave_up(attempts);
        }
        // Events of a poll that was stopped or replaced
        _ => {}
    }
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal().draw(|frame| {
        match state.current_screen {
            Screen::Login => {
                LoginScreen::render(frame, state);
            }
            Screen::Register => {
                RegisterScreen::render(frame, state);
            }
            Screen::Dashboard => {
                DashboardScreen::render(frame, state);
            }
        }

        // Render help overlay if visible
        if state.ui_state.help_visible {
            HelpOverlay::render(frame, state.current_screen, state.tab);
        }
    })?;

    Ok(())
}
