//! `config.toml` loading and validation
//!
//! Every key is optional. Values that fail validation produce a warning and
//! fall back to the default; the application always starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use logdash_api::{DEFAULT_BASE_URL, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use logdash_types::expand_home;

pub const DEFAULT_PER_PAGE: u32 = 50;
pub const MAX_PER_PAGE: u32 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 600;
const MIN_POLL_INTERVAL_MS: u64 = 100;
const MAX_POLL_INTERVAL_MS: u64 = 60_000;
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Raw shape of config.toml. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub server: ServerSection,
    pub session: SessionSection,
    pub uploads: UploadsSection,
    pub search: SearchSection,
    pub logging: LoggingSection,
}

/// `[server]`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

/// `[session]`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Where the sign-in token is kept
    pub file: Option<String>,
}

/// `[uploads]`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UploadsSection {
    pub poll_interval_ms: Option<u64>,
    /// 0 polls until cancelled
    pub max_poll_attempts: Option<u32>,
}

/// `[search]`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub per_page: Option<u32>,
}

/// `[logging]`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub session_file: Option<PathBuf>,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub per_page: u32,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            session_file: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            per_page: DEFAULT_PER_PAGE,
            log_level: None,
            log_file: None,
        }
    }
}

/// `<config dir>/logdash/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logdash").join("config.toml"))
}

/// Normalize a server URL: http(s) scheme and a host required, no trailing slash
pub fn validate_base_url(raw: &str) -> Result<String, String> {
    let url = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(url).map_err(|e| format!("\"{raw}\" is not a valid URL ({e})"))?;
    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if matches!(parsed.scheme(), "http" | "https") && has_host {
        Ok(url.to_string())
    } else {
        Err(format!("\"{raw}\" is not an http:// or https:// URL"))
    }
}

/// Load and validate the config file at `path`.
///
/// A missing file yields defaults with no warnings. An unreadable or
/// unparseable file yields defaults with a warning.
pub fn load_config(path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings = Vec::new();

    if !path.exists() {
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    match toml::from_str::<RawConfig>(&content) {
        Ok(raw) => {
            let config = validate(raw, &mut warnings);
            (config, warnings)
        }
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                path.display()
            ));
            (AppConfig::default(), warnings)
        }
    }
}

fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    if let Some(url) = raw.server.base_url {
        match validate_base_url(&url) {
            Ok(url) => config.base_url = url,
            Err(e) => warnings.push(format!(
                "[server] base_url {e}. Using default ({DEFAULT_BASE_URL})."
            )),
        }
    }

    if let Some(secs) = raw.server.timeout_secs {
        if (1..=MAX_TIMEOUT_SECS).contains(&secs) {
            config.timeout = Duration::from_secs(secs);
        } else {
            warnings.push(format!(
                "[server] timeout_secs = {secs} is out of range (1-{MAX_TIMEOUT_SECS}). Using default ({DEFAULT_TIMEOUT_SECS})."
            ));
        }
    }

    if let Some(secs) = raw.server.connect_timeout_secs {
        if (1..=MAX_TIMEOUT_SECS).contains(&secs) {
            config.connect_timeout = Duration::from_secs(secs);
        } else {
            warnings.push(format!(
                "[server] connect_timeout_secs = {secs} is out of range (1-{MAX_TIMEOUT_SECS}). Using default ({DEFAULT_CONNECT_TIMEOUT_SECS})."
            ));
        }
    }

    if let Some(file) = raw.session.file.filter(|f| !f.trim().is_empty()) {
        config.session_file = Some(expand_home(file.trim()));
    }

    if let Some(ms) = raw.uploads.poll_interval_ms {
        if (MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&ms) {
            config.poll_interval = Duration::from_millis(ms);
        } else {
            warnings.push(format!(
                "[uploads] poll_interval_ms = {ms} is out of range ({MIN_POLL_INTERVAL_MS}-{MAX_POLL_INTERVAL_MS}). Using default ({}).",
                DEFAULT_POLL_INTERVAL.as_millis()
            ));
        }
    }

    if let Some(attempts) = raw.uploads.max_poll_attempts {
        config.max_poll_attempts = attempts;
    }

    if let Some(per_page) = raw.search.per_page {
        if (1..=MAX_PER_PAGE).contains(&per_page) {
            config.per_page = per_page;
        } else {
            warnings.push(format!(
                "[search] per_page = {per_page} is out of range (1-{MAX_PER_PAGE}). Using default ({DEFAULT_PER_PAGE})."
            ));
        }
    }

    if let Some(level) = raw.logging.level {
        if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. Valid values: {}. Using default (warn).",
                LOG_LEVELS.join(", ")
            ));
        }
    }

    if let Some(file) = raw.logging.file.filter(|f| !f.trim().is_empty()) {
        config.log_file = Some(expand_home(file.trim()));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(content: &str) -> (AppConfig, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        load_config(&path)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_applied() {
        let (config, warnings) = load(
            r#"
            [server]
            base_url = "https://logs.example.com/"
            timeout_secs = 5

            [uploads]
            poll_interval_ms = 500
            max_poll_attempts = 0

            [search]
            per_page = 25

            [logging]
            level = "DEBUG"
            file = "/tmp/logdash.log"

            [unknown]
            key = 1
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.base_url, "https://logs.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_poll_attempts, 0);
        assert_eq!(config.per_page, 25);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/logdash.log")));
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let (config, warnings) = load(
            r#"
            [server]
            base_url = "localhost:8000"

            [uploads]
            poll_interval_ms = 0

            [search]
            per_page = 0

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 4);
        assert!(warnings.iter().any(|w| w.starts_with("[search] per_page = 0")));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.per_page, DEFAULT_PER_PAGE);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_warns() {
        let (config, warnings) = load("[server\nbase_url = ");
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_base_url_validation() {
        assert_eq!(
            validate_base_url(" http://localhost:8000/ ").as_deref(),
            Ok("http://localhost:8000")
        );
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("https://").is_err());
        assert!(validate_base_url("http://a b").is_err());
        assert!(validate_base_url("http://").is_err());
        assert_eq!(
            validate_base_url("https://logs.example.com:8443/api/").as_deref(),
            Ok("https://logs.example.com:8443/api")
        );
    }
}
