//! HTTP client for logdash
//!
//! This crate talks to the log-management server: authentication, log
//! uploads and their ingestion status, search, and analytics. It also keeps
//! the persisted sign-in state.

mod client;
mod error;
mod poller;
mod session;
mod token_store;

pub use client::{ApiClient, ClientConfig, Credentials, DEFAULT_BASE_URL, LoginResponse};
pub use error::{ApiError, extract_detail};
pub use poller::{
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollEvent, PollSettings, UploadPoller,
};
pub use session::{
    AuthOutcome, LOGIN_FAILED, REGISTRATION_FAILED, SESSION_EXPIRED, Session, sign_in, sign_up,
};
pub use token_store::{StoredSession, TokenStore};

// Re-export types used in our public API
pub use logdash_types::{
    AnalyticsSnapshot, LogRecord, NewAccount, SearchPage, SearchQuery, UploadReceipt, UploadState,
    User,
};
