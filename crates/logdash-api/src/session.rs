//! Authentication session shared by the screens
//!
//! The session owns the API client's token and the signed-in user. Network
//! work is split from state changes so the UI can run the request on a
//! background task and apply the [`AuthOutcome`] afterwards.

use logdash_types::{NewAccount, User};

use crate::client::{ApiClient, Credentials};
use crate::error::ApiError;
use crate::token_store::{StoredSession, TokenStore};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const SESSION_EXPIRED: &str = "Session expired, please sign in again";

/// Result of a sign-in or sign-up attempt
#[derive(Debug)]
pub enum AuthOutcome {
    SignedIn(Credentials),
    LoginFailed(ApiError),
    RegistrationFailed(ApiError),
}

/// Log in with a username and password
pub async fn sign_in(client: &ApiClient, username: &str, password: &str) -> AuthOutcome {
    match client.authenticate(username, password).await {
        Ok(credentials) => AuthOutcome::SignedIn(credentials),
        Err(e) => AuthOutcome::LoginFailed(e),
    }
}

/// Create an account, then log in with it.
///
/// A failure of either step is reported as a registration failure.
pub async fn sign_up(client: &ApiClient, account: &NewAccount) -> AuthOutcome {
    if let Err(e) = client.register(account).await {
        return AuthOutcome::RegistrationFailed(e);
    }
    match client.authenticate(&account.username, &account.password).await {
        Ok(credentials) => AuthOutcome::SignedIn(credentials),
        Err(e) => AuthOutcome::RegistrationFailed(e),
    }
}

/// The signed-in state of the application
#[derive(Debug)]
pub struct Session {
    client: ApiClient,
    store: TokenStore,
    user: Option<User>,
    error: Option<String>,
}

impl Session {
    /// Resume from the session file, if any. The token is not verified.
    /// A file without a user record counts as no session.
    pub fn restore(mut client: ApiClient, store: TokenStore) -> Self {
        let user = match store.load() {
            Some(StoredSession {
                token,
                user: Some(user),
                ..
            }) => {
                client.set_token(token);
                tracing::info!(path = %store.path().display(), "resumed stored session");
                Some(user)
            }
            Some(_) => {
                tracing::info!(path = %store.path().display(), "ignoring stored session without a user");
                client.clear_token();
                None
            }
            None => {
                client.clear_token();
                None
            }
        };

        Self {
            client,
            store,
            user,
            error: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Banner text of the last failed auth attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.token().is_some()
    }

    /// Reset the banner before a new attempt
    pub fn begin_attempt(&mut self) {
        self.error = None;
    }

    /// Apply the outcome of [`sign_in`] or [`sign_up`].
    ///
    /// On success the token and user are stored; on failure the banner is set
    /// and the error is handed back to the caller.
    pub fn apply(&mut self, outcome: AuthOutcome) -> Result<(), ApiError> {
        match outcome {
            AuthOutcome::SignedIn(credentials) => {
                let stored =
                    StoredSession::new(credentials.token.clone(), Some(credentials.user.clone()));
                if let Err(e) = self.store.save(&stored) {
                    tracing::warn!(path = %self.store.path().display(), error = %e, "failed to persist session");
                }
                self.client.set_token(credentials.token);
                tracing::info!(username = %credentials.user.username, "signed in");
                self.user = Some(credentials.user);
                self.error = None;
                Ok(())
            }
            AuthOutcome::LoginFailed(e) => {
                tracing::info!(error = %e, "login failed");
                self.error = Some(e.banner(LOGIN_FAILED));
                Err(e)
            }
            AuthOutcome::RegistrationFailed(e) => {
                tracing::info!(error = %e, "registration failed");
                self.error = Some(e.banner(REGISTRATION_FAILED));
                Err(e)
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        self.begin_attempt();
        let outcome = sign_in(&self.client, username, password).await;
        self.apply(outcome)
    }

    pub async fn register(&mut self, account: &NewAccount) -> Result<(), ApiError> {
        self.begin_attempt();
        let outcome = sign_up(&self.client, account).await;
        self.apply(outcome)
    }

    /// Forget the token locally and on disk
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(path = %self.store.path().display(), error = %e, "failed to delete session file");
        }
        self.client.clear_token();
        self.user = None;
        tracing::info!("signed out");
    }

    /// Sign out because the server rejected the token
    pub fn expire(&mut self) {
        self.logout();
        self.error = Some(SESSION_EXPIRED.to_string());
    }
}
