use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, DashboardTab, Screen};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LoginForm,
    RegisterForm,
    DashboardUpload,
    DashboardSearch,
    DashboardAnalytics,
    /// A dashboard text field is being edited
    TextInput,
    Help,
}

impl KeyContext {
    /// Dashboard context for a tab
    pub fn for_tab(tab: DashboardTab) -> Self {
        match tab {
            DashboardTab::Upload => Self::DashboardUpload,
            DashboardTab::Search => Self::DashboardSearch,
            DashboardTab::Analytics => Self::DashboardAnalytics,
        }
    }
}

type BindingMap = HashMap<KeyBinding, Action>;

/// Bind an uppercase letter with and without the shift modifier; terminals
/// disagree on which one they report.
fn insert_upper(map: &mut BindingMap, c: char, action: Action) {
    map.insert(KeyBinding::shift(KeyCode::Char(c)), action.clone());
    map.insert(KeyBinding::new(KeyCode::Char(c)), action);
}

fn insert_back_tab(map: &mut BindingMap, action: Action) {
    map.insert(KeyBinding::new(KeyCode::BackTab), action.clone());
    map.insert(KeyBinding::shift(KeyCode::BackTab), action);
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, BindingMap>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings (dashboard only; forms capture plain characters)
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::F(1)), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('x')), Action::Logout);
        global.insert(
            KeyBinding::new(KeyCode::Char('1')),
            Action::SelectTab(DashboardTab::Upload),
        );
        global.insert(
            KeyBinding::new(KeyCode::Char('2')),
            Action::SelectTab(DashboardTab::Search),
        );
        global.insert(
            KeyBinding::new(KeyCode::Char('3')),
            Action::SelectTab(DashboardTab::Analytics),
        );
        global.insert(KeyBinding::new(KeyCode::Tab), Action::NextTab);
        insert_back_tab(&mut global, Action::PrevTab);
        bindings.insert(KeyContext::Global, global);

        // Login form
        let mut login = HashMap::new();
        login.insert(KeyBinding::new(KeyCode::Tab), Action::FocusNext);
        login.insert(KeyBinding::new(KeyCode::Down), Action::FocusNext);
        insert_back_tab(&mut login, Action::FocusPrev);
        login.insert(KeyBinding::new(KeyCode::Up), Action::FocusPrev);
        login.insert(KeyBinding::new(KeyCode::Enter), Action::Submit);
        login.insert(KeyBinding::new(KeyCode::Backspace), Action::Backspace);
        login.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::ClearInput);
        login.insert(
            KeyBinding::ctrl(KeyCode::Char('r')),
            Action::Navigate(Screen::Register),
        );
        login.insert(KeyBinding::new(KeyCode::Esc), Action::Quit);
        login.insert(KeyBinding::new(KeyCode::F(1)), Action::ToggleHelp);
        bindings.insert(KeyContext::LoginForm, login);

        // Register form
        let mut register = HashMap::new();
        register.insert(KeyBinding::new(KeyCode::Tab), Action::FocusNext);
        register.insert(KeyBinding::new(KeyCode::Down), Action::FocusNext);
        insert_back_tab(&mut register, Action::FocusPrev);
        register.insert(KeyBinding::new(KeyCode::Up), Action::FocusPrev);
        register.insert(KeyBinding::new(KeyCode::Left), Action::ToggleRole);
        register.insert(KeyBinding::new(KeyCode::Right), Action::ToggleRole);
        register.insert(KeyBinding::new(KeyCode::Enter), Action::Submit);
        register.insert(KeyBinding::new(KeyCode::Backspace), Action::Backspace);
        register.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::ClearInput);
        register.insert(
            KeyBinding::ctrl(KeyCode::Char('l')),
            Action::Navigate(Screen::Login),
        );
        register.insert(KeyBinding::new(KeyCode::Esc), Action::Navigate(Screen::Login));
        register.insert(KeyBinding::new(KeyCode::F(1)), Action::ToggleHelp);
        bindings.insert(KeyContext::RegisterForm, register);

        // Upload tab
        let mut upload = HashMap::new();
        upload.insert(KeyBinding::new(KeyCode::Char('e')), Action::StartEdit);
        upload.insert(KeyBinding::new(KeyCode::Char('/')), Action::StartEdit);
        upload.insert(KeyBinding::new(KeyCode::Char('u')), Action::Upload);
        upload.insert(KeyBinding::new(KeyCode::Enter), Action::Upload);
        insert_upper(&mut upload, 'C', Action::CancelPoll);
        upload.insert(KeyBinding::new(KeyCode::Char('r')), Action::RefreshUploads);
        upload.insert(KeyBinding::new(KeyCode::Char('j')), Action::RowDown);
        upload.insert(KeyBinding::new(KeyCode::Down), Action::RowDown);
        upload.insert(KeyBinding::new(KeyCode::Char('k')), Action::RowUp);
        upload.insert(KeyBinding::new(KeyCode::Up), Action::RowUp);
        bindings.insert(KeyContext::DashboardUpload, upload);

        // Search tab
        let mut search = HashMap::new();
        search.insert(KeyBinding::new(KeyCode::Char('/')), Action::StartEdit);
        search.insert(KeyBinding::new(KeyCode::Char('e')), Action::StartEdit);
        search.insert(KeyBinding::new(KeyCode::Enter), Action::RunSearch);
        search.insert(KeyBinding::new(KeyCode::Char('v')), Action::NextLevel);
        insert_upper(&mut search, 'V', Action::PrevLevel);
        search.insert(KeyBinding::new(KeyCode::Char('s')), Action::NextSource);
        insert_upper(&mut search, 'S', Action::PrevSource);
        search.insert(KeyBinding::new(KeyCode::Char('t')), Action::NextTimeRange);
        insert_upper(&mut search, 'T', Action::PrevTimeRange);
        search.insert(KeyBinding::new(KeyCode::Char('c')), Action::ClearFilters);
        search.insert(KeyBinding::new(KeyCode::Char('n')), Action::NextPage);
        search.insert(KeyBinding::new(KeyCode::Char(']')), Action::NextPage);
        search.insert(KeyBinding::new(KeyCode::PageDown), Action::NextPage);
        search.insert(KeyBinding::new(KeyCode::Char('p')), Action::PrevPage);
        search.insert(KeyBinding::new(KeyCode::Char('[')), Action::PrevPage);
        search.insert(KeyBinding::new(KeyCode::PageUp), Action::PrevPage);
        search.insert(KeyBinding::new(KeyCode::Char('j')), Action::RowDown);
        search.insert(KeyBinding::new(KeyCode::Down), Action::RowDown);
        search.insert(KeyBinding::new(KeyCode::Char('k')), Action::RowUp);
        search.insert(KeyBinding::new(KeyCode::Up), Action::RowUp);
        search.insert(KeyBinding::new(KeyCode::Char('d')), Action::ToggleDetail);
        bindings.insert(KeyContext::DashboardSearch, search);

        // Analytics tab
        let mut analytics = HashMap::new();
        analytics.insert(KeyBinding::new(KeyCode::Char('r')), Action::LoadAnalytics);
        analytics.insert(KeyBinding::new(KeyCode::Enter), Action::LoadAnalytics);
        bindings.insert(KeyContext::DashboardAnalytics, analytics);

        // Text input bindings (when a dashboard field is active)
        let mut text_input = HashMap::new();
        text_input.insert(KeyBinding::new(KeyCode::Enter), Action::FinishEdit);
        text_input.insert(KeyBinding::new(KeyCode::Esc), Action::CancelEdit);
        text_input.insert(KeyBinding::new(KeyCode::Backspace), Action::Backspace);
        text_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::ClearInput);
        bindings.insert(KeyContext::TextInput, text_input);

        // Help overlay swallows everything else
        let mut help = HashMap::new();
        help.insert(KeyBinding::new(KeyCode::Esc), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        help.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::F(1)), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Char('q')), Action::ToggleHelp);
        help.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::Help, help);

        Self { bindings }
    }

    fn lookup(&self, context: KeyContext, binding: &KeyBinding) -> Option<Action> {
        self.bindings.get(&context)?.get(binding).cloned()
    }

    /// Look up action for key event in given dashboard context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings, then fall back to global
        self.lookup(context, &binding)
            .or_else(|| self.lookup(KeyContext::Global, &binding))
    }

    /// Handle key event on a login or register form.
    /// Special keys map to actions, printable characters become input.
    pub fn get_form_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);
        if let Some(action) = self.lookup(context, &binding) {
            return Some(action);
        }
        if binding == KeyBinding::ctrl(KeyCode::Char('c')) {
            return Some(Action::Quit);
        }
        Self::char_input(key)
    }

    /// Handle key event while a dashboard text field is being edited
    pub fn get_text_input_action(&self, key: &KeyEvent) -> Option<Action> {
        self.get_form_action(KeyContext::TextInput, key)
    }

    /// Handle key event while the help overlay is open
    pub fn get_help_action(&self, key: &KeyEvent) -> Option<Action> {
        self.lookup(KeyContext::Help, &KeyBinding::from_event(key))
    }

    fn char_input(key: &KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                Some(Action::Input(c))
            }
            _ => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_forms_capture_plain_characters() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_form_action(KeyContext::LoginForm, &key(KeyCode::Char('q'))),
            Some(Action::Input('q'))
        );
        assert_eq!(
            kb.get_form_action(
                KeyContext::LoginForm,
                &with(KeyCode::Char('Q'), KeyModifiers::SHIFT)
            ),
            Some(Action::Input('Q'))
        );
        assert_eq!(
            kb.get_form_action(KeyContext::LoginForm, &key(KeyCode::Enter)),
            Some(Action::Submit)
        );
        assert_eq!(
            kb.get_form_action(
                KeyContext::RegisterForm,
                &with(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_screen_switching_keys() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_form_action(
                KeyContext::LoginForm,
                &with(KeyCode::Char('r'), KeyModifiers::CONTROL)
            ),
            Some(Action::Navigate(Screen::Register))
        );
        assert_eq!(
            kb.get_form_action(KeyContext::RegisterForm, &key(KeyCode::Esc)),
            Some(Action::Navigate(Screen::Login))
        );
        assert_eq!(
            kb.get_form_action(
                KeyContext::RegisterForm,
                &with(KeyCode::BackTab, KeyModifiers::SHIFT)
            ),
            Some(Action::FocusPrev)
        );
    }

    #[test]
    fn test_dashboard_falls_back_to_global() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::DashboardSearch, &key(KeyCode::Char('v'))),
            Some(Action::NextLevel)
        );
        assert_eq!(
            kb.get_action(KeyContext::DashboardSearch, &key(KeyCode::Char('2'))),
            Some(Action::SelectTab(DashboardTab::Search))
        );
        assert_eq!(
            kb.get_action(KeyContext::DashboardUpload, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        // Same letter, different tab
        assert_eq!(
            kb.get_action(KeyContext::DashboardUpload, &key(KeyCode::Char('r'))),
            Some(Action::RefreshUploads)
        );
        assert_eq!(
            kb.get_action(KeyContext::DashboardAnalytics, &key(KeyCode::Char('r'))),
            Some(Action::LoadAnalytics)
        );
    }

    #[test]
    fn test_uppercase_with_or_without_shift() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(
                KeyContext::DashboardSearch,
                &with(KeyCode::Char('V'), KeyModifiers::SHIFT)
            ),
            Some(Action::PrevLevel)
        );
        assert_eq!(
            kb.get_action(KeyContext::DashboardSearch, &key(KeyCode::Char('V'))),
            Some(Action::PrevLevel)
        );
    }

    #[test]
    fn test_text_input_and_help() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_text_input_action(&key(KeyCode::Char('x'))),
            Some(Action::Input('x'))
        );
        assert_eq!(
            kb.get_text_input_action(&key(KeyCode::Esc)),
            Some(Action::CancelEdit)
        );
        assert_eq!(kb.get_help_action(&key(KeyCode::Esc)), Some(Action::ToggleHelp));
        assert_eq!(kb.get_help_action(&key(KeyCode::Char('x'))), None);
    }
}
