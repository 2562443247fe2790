// Logging setup.
// Command-line runs log to stderr; the terminal preview logs to a timestamped file.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cache;
use crate::config::LogSettings;
use crate::error::{FolioError, Result};

/// Fallback when the configured level is not recognised.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Normalise a level name from the config file.
pub fn parse_level(value: &str) -> &'static str {
    match value.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" | "none" | "disabled" => "off",
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// `RUST_LOG` wins, then `--debug`, then the config level.
fn env_filter(settings: &LogSettings, debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if debug {
            "debug"
        } else {
            parse_level(&settings.level)
        };
        EnvFilter::new(level)
    })
}

/// Log to stderr. A second call is a no-op.
pub fn init_cli(settings: &LogSettings, debug: bool) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter(settings, debug))
        .with(layer)
        .try_init();
}

/// Log to a new file under the platform data directory, pruning old files first.
/// Returns the log file path, or `None` when logging is off or no data directory exists.
pub fn init_file(settings: &LogSettings, debug: bool) -> Result<Option<PathBuf>> {
    if parse_level(&settings.level) == "off" && !debug {
        return Ok(None);
    }
    let Some(dir) = cache::log_dir() else {
        return Ok(None);
    };
    fs::create_dir_all(&dir)?;
    let pruned = prune_logs(&dir, settings.retention_hours)?;

    let path = dir.join(log_file_name(chrono::Local::now()));
    let file = File::create(&path)?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(settings, debug))
        .with(layer)
        .try_init()
        .map_err(|e| FolioError::Other(format!("logging already initialised: {}", e)))?;

    tracing::info!(path = %path.display(), "preview logging initialized");
    if pruned > 0 {
        tracing::info!("Cleaned up {} old log file(s)", pruned);
    }
    Ok(Some(path))
}

fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("preview_{}.log", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Delete `.log` files in `dir` last modified more than `retention_hours` ago.
pub fn prune_logs(dir: &Path, retention_hours: u32) -> io::Result<u32> {
    if !dir.exists() {
        return Ok(0);
    }

    let retention = Duration::from_secs(u64::from(retention_hours) * 3600);
    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }

        let age = fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if matches!(age, Some(age) if age > retention) && fs::remove_file(&path).is_ok() {
            deleted += 1;
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), "debug");
        assert_eq!(parse_level("warning"), "warn");
        assert_eq!(parse_level("none"), "off");
        assert_eq!(parse_level("loud"), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_log_file_name() {
        let now = chrono::Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_file_name(now), "preview_2024-03-09_07-05-01.log");
    }

    #[test]
    fn test_prune_logs_removes_only_old_log_files() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("preview_old.log");
        let fresh = dir.path().join("preview_new.log");
        let other = dir.path().join("notes.txt");
        for path in [&old, &fresh, &other] {
            fs::write(path, "x").unwrap();
        }

        let two_days_ago = SystemTime::now() - Duration::from_secs(48 * 3600);
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(two_days_ago)
            .unwrap();
        File::options()
            .write(true)
            .open(&other)
            .unwrap()
            .set_modified(two_days_ago)
            .unwrap();

        assert_eq!(prune_logs(dir.path(), 24).unwrap(), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_prune_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(prune_logs(&dir.path().join("absent"), 24).unwrap(), 0);
    }
}
