use std::sync::LazyLock;

use regex::Regex;

use logdash_types::{NewAccount, Role};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

const MAX_FIELD_LEN: usize = 256;

/// A single-line text input
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    masked: bool,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field whose contents render as bullets
    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() && self.value.chars().count() < MAX_FIELD_LEN {
            self.value.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Text as it should appear on screen
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Focusable fields of the login form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

/// Login form state
#[derive(Clone, Debug)]
pub struct LoginForm {
    pub username: TextField,
    pub password: TextField,
    pub focus: LoginField,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: TextField::new(),
            password: TextField::masked(),
            focus: LoginField::Username,
        }
    }
}

impl LoginForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn focus_prev(&mut self) {
        // Two fields: same as next
        self.focus_next();
    }

    fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn input(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn clear_field(&mut self) {
        self.focused_mut().clear();
    }

    /// Username and password to submit, or the reason they can't be
    pub fn credentials(&self) -> Result<(String, String), String> {
        if self.username.is_blank() || self.password.value().is_empty() {
            return Err("Username and password are required".to_string());
        }
        Ok((
            self.username.value().trim().to_string(),
            self.password.value().to_string(),
        ))
    }

    /// Forget the password, keep the username
    pub fn reset(&mut self) {
        self.password.clear();
        self.focus = LoginField::Username;
    }
}

/// Focusable fields of the registration form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegisterField {
    #[default]
    Username,
    Email,
    Password,
    Role,
}

impl RegisterField {
    const ORDER: [RegisterField; 4] = [
        RegisterField::Username,
        RegisterField::Email,
        RegisterField::Password,
        RegisterField::Role,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }
}

/// Registration form state
#[derive(Clone, Debug)]
pub struct RegisterForm {
    pub username: TextField,
    pub email: TextField,
    pub password: TextField,
    pub role: Role,
    pub focus: RegisterField,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            username: TextField::new(),
            email: TextField::new(),
            password: TextField::masked(),
            role: Role::Viewer,
            focus: RegisterField::Username,
        }
    }
}

impl RegisterForm {
    pub fn focus_next(&mut self) {
        let i = (self.focus.index() + 1) % RegisterField::ORDER.len();
        self.focus = RegisterField::ORDER[i];
    }

    pub fn focus_prev(&mut self) {
        let len = RegisterField::ORDER.len();
        let i = (self.focus.index() + len - 1) % len;
        self.focus = RegisterField::ORDER[i];
    }

    fn focused_mut(&mut self) -> Option<&mut TextField> {
        match self.focus {
            RegisterField::Username => Some(&mut self.username),
            RegisterField::Email => Some(&mut self.email),
            RegisterField::Password => Some(&mut self.password),
            RegisterField::Role => None,
        }
    }

    pub fn input(&mut self, c: char) {
        match self.focused_mut() {
            Some(field) => field.push(c),
            // Space on the role selector flips it
            None if c == ' ' => self.toggle_role(),
            None => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_mut() {
            field.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(field) = self.focused_mut() {
            field.clear();
        }
    }

    pub fn toggle_role(&mut self) {
        self.role = self.role.toggle();
    }

    /// Validated account to register, or the first problem found
    pub fn account(&self) -> Result<NewAccount, String> {
        if self.username.is_blank() || self.email.is_blank() || self.password.value().is_empty()
        {
            return Err("Username, email and password are required".to_string());
        }
        let email = self.email.value().trim();
        if !EMAIL_RE.is_match(email) {
            return Err("Enter a valid email address".to_string());
        }
        Ok(NewAccount {
            username: self.username.value().trim().to_string(),
            email: email.to_string(),
            password: self.password.value().to_string(),
            role: self.role,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
