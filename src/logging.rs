//! Tracing setup
//!
//! The terminal belongs to the UI, so log output goes to a file.
//! Level priority: `RUST_LOG` > `--debug` > config level > `warn`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

/// `~/.logdash/logdash.log`
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".logdash")
        .join("logdash.log")
}

/// Pick the filter directive from the configured sources
pub fn filter_directive(
    rust_log: Option<&str>,
    debug_flag: bool,
    config_level: Option<&str>,
) -> String {
    if let Some(directive) = rust_log.filter(|d| !d.trim().is_empty()) {
        directive.to_string()
    } else if debug_flag {
        "debug".to_string()
    } else {
        config_level.unwrap_or(DEFAULT_LEVEL).to_string()
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber writing to `path`
pub fn init(debug_flag: bool, config_level: Option<&str>, path: &Path) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(rust_log.as_deref(), debug_flag, config_level);
    let filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
        .context("building log filter")?;

    let file = open_log_file(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        path = %path.display(),
        "logging initialised"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_priority() {
        assert_eq!(
            filter_directive(Some("logdash_api=trace"), true, Some("info")),
            "logdash_api=trace"
        );
        assert_eq!(filter_directive(None, true, Some("info")), "debug");
        assert_eq!(filter_directive(Some("  "), false, Some("info")), "info");
        assert_eq!(filter_directive(None, false, None), "warn");
    }

    #[test]
    fn test_log_file_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logdash.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
