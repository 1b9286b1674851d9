//! HTTP client for the log-management API

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use logdash_types::{
    AnalyticsInterval, AnalyticsSnapshot, DistributionField, NamedCount, NamedSeries, NewAccount,
    SearchPage, SearchQuery, SeriesEnvelope, TimeSeriesPoint, UploadReceipt, UploadStatus, User,
    timestamp,
};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOP_ERRORS_DEFAULT: u32 = 10;

/// Connection settings for [`ApiClient`]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Response of `POST /auth/login`
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<User>,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// A bearer token together with the user it belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

/// Time-series responses come either wrapped in `series` or as a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeSeriesBody {
    Wrapped(SeriesEnvelope<NamedSeries>),
    Bare(Vec<TimeSeriesPoint>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountsBody {
    Wrapped(SeriesEnvelope<NamedCount>),
    Bare(Vec<NamedCount>),
}

impl CountsBody {
    fn into_counts(self) -> Vec<NamedCount> {
        match self {
            Self::Wrapped(envelope) => envelope.series,
            Self::Bare(counts) => counts,
        }
    }
}

/// Client for the log-management HTTP API.
///
/// Cheap to clone; clones share the connection pool. The bearer token, when
/// set, is attached to every request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn register(&self, account: &NewAccount) -> Result<User, ApiError> {
        tracing::info!(username = %account.username, role = account.role.as_str(), "registering account");
        let request = self.request(Method::POST, "/auth/register").json(account);
        self.send(request, "register").await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        tracing::info!(%username, "signing in");
        let request = self
            .request(Method::POST, "/auth/login")
            .form(&[("username", username), ("password", password)]);
        self.send(request, "login").await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let request = self.protected(Method::GET, "/auth/me")?;
        self.send(request, "me").await
    }

    /// Log in and resolve the user record that goes with the token.
    ///
    /// Falls back to `GET /auth/me` when the login response carries no user,
    /// and to a placeholder user when that lookup fails as well.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Credentials, ApiError> {
        let login = self.login(username, password).await?;
        if !login.token_type.eq_ignore_ascii_case("bearer") {
            tracing::warn!(token_type = %login.token_type, "unexpected token type");
        }

        let user = match login.user {
            Some(user) => user,
            None => {
                let mut scoped = self.clone();
                scoped.set_token(login.access_token.clone());
                match scoped.me().await {
                    Ok(user) => user,
                    Err(e) => {
                        tracing::debug!(error = %e, "user lookup failed, using placeholder");
                        User::placeholder(username)
                    }
                }
            }
        };

        Ok(Credentials {
            token: login.access_token,
            user,
        })
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Submit a log file as `multipart/form-data` (part name `file`)
    pub async fn upload_log(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let request = self.protected(Method::POST, "/uploads/")?;

        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.log".to_string());

        tracing::info!(file = %file_name, size = bytes.len(), "uploading log file");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime_for(&file_name))
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.send(request.multipart(form), "upload").await
    }

    pub async fn upload_status(&self, upload_id: i64) -> Result<UploadStatus, ApiError> {
        let request = self.protected(Method::GET, &format!("/uploads/{upload_id}/status"))?;
        self.send(request, "upload status").await
    }

    pub async fn list_uploads(&self, limit: u32) -> Result<Vec<UploadReceipt>, ApiError> {
        let request = self
            .protected(Method::GET, "/uploads/")?
            .query(&[("skip", "0".to_string()), ("limit", limit.to_string())]);
        self.send(request, "list uploads").await
    }

    // ------------------------------------------------------------------
    // Search & analytics
    // ------------------------------------------------------------------

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ApiError> {
        tracing::debug!(page = query.page, per_page = query.per_page, "searching logs");
        let request = self
            .protected(Method::GET, "/search/")?
            .query(&query.to_params());
        self.send(request, "search").await
    }

    pub async fn time_series(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: AnalyticsInterval,
    ) -> Result<Vec<TimeSeriesPoint>, ApiError> {
        let request = self
            .protected(Method::GET, "/analytics/time-series")?
            .query(&[
                ("start_time", timestamp::to_param(&start)),
                ("end_time", timestamp::to_param(&end)),
                ("interval", interval.as_param().to_string()),
            ]);
        let body: TimeSeriesBody = self.send(request, "time series").await?;
        Ok(match body {
            TimeSeriesBody::Wrapped(envelope) => envelope
                .series
                .into_iter()
                .next()
                .map(|s| s.data)
                .unwrap_or_default(),
            TimeSeriesBody::Bare(points) => points,
        })
    }

    pub async fn distribution(&self, field: DistributionField) -> Result<Vec<NamedCount>, ApiError> {
        let request = self
            .protected(Method::GET, "/analytics/distribution")?
            .query(&[("field", field.as_param())]);
        let body: CountsBody = self.send(request, "distribution").await?;
        Ok(body.into_counts())
    }

    pub async fn top_errors(&self, n: u32) -> Result<Vec<NamedCount>, ApiError> {
        let request = self
            .protected(Method::GET, "/analytics/top-errors")?
            .query(&[("n", n.to_string())]);
        let body: CountsBody = self.send(request, "top errors").await?;
        Ok(body.into_counts())
    }

    /// Fetch all analytics views for the last 24 hours concurrently
    pub async fn analytics_snapshot(&self, now: DateTime<Utc>) -> Result<AnalyticsSnapshot, ApiError> {
        let start = now - chrono::Duration::hours(24);
        let (levels, sources, top_errors, hourly) = tokio::try_join!(
            self.distribution(DistributionField::LogLevel),
            self.distribution(DistributionField::Source),
            self.top_errors(TOP_ERRORS_DEFAULT),
            self.time_series(start, now, AnalyticsInterval::Hour),
        )?;

        Ok(AnalyticsSnapshot {
            levels,
            sources,
            top_errors,
            hourly,
        })
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Request builder for endpoints that require a signed-in user
    fn protected(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        if self.token.is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        Ok(self.request(method, path))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &'static str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "request failed");
            ApiError::Request(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(endpoint, status = status.as_u16(), "request rejected");
            return Err(ApiError::from_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".json") {
        "application/json"
    } else {
        "text/plain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new(&ClientConfig {
            base_url: "http://example.test:8000/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://example.test:8000");
        assert!(client.token().is_none());
    }

    #[tokio::test]
    async fn test_protected_calls_need_a_token() {
        let client = ApiClient::new(&ClientConfig::default()).unwrap();
        let err = client.search(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_debug_hides_token() {
        let mut client = ApiClient::new(&ClientConfig::default()).unwrap();
        client.set_token("secret-token");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("authenticated: true"));
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("events.JSON"), "application/json");
        assert_eq!(mime_for("access.log"), "text/plain");
    }
}
