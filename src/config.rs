// Configuration for repofolio.
// Loaded from config.toml or an explicit path; a missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub cache: CacheConfig,
    pub resume: ResumeConfig,
    pub ui: UiConfig,
    pub log: LogSettings,
}

/// Repository source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub username: String,
    /// Structured endpoint; derived from `username` when unset.
    pub api_url: Option<String>,
    /// Repository listing page; derived from `username` when unset.
    pub page_url: Option<String>,
    pub max_repos: usize,
    pub api_timeout_ms: u64,
    pub scrape_timeout_ms: u64,
    pub background_api_timeout_ms: u64,
    pub background_scrape_timeout_ms: u64,
    pub overall_timeout_ms: u64,
    /// Proxy URL templates tried in order by the page scraper.
    /// `{url}` expands to the encoded page URL, `{path}` to its path.
    pub proxies: Vec<String>,
    pub scrape_enabled: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: "GLOKADHI".to_string(),
            api_url: None,
            page_url: None,
            max_repos: 8,
            api_timeout_ms: 2200,
            scrape_timeout_ms: 3000,
            background_api_timeout_ms: 3500,
            background_scrape_timeout_ms: 4000,
            overall_timeout_ms: 5000,
            proxies: vec![
                "https://api.allorigins.win/raw?url={url}".to_string(),
                "https://r.jina.ai/http://github.com{path}?tab=repositories".to_string(),
            ],
            scrape_enabled: true,
        }
    }
}

impl GitHubConfig {
    pub fn api_url(&self) -> String {
        self.api_url.clone().unwrap_or_else(|| {
            format!(
                "https://api.github.com/users/{}/repos?per_page=100&sort=pushed",
                self.username
            )
        })
    }

    pub fn page_url(&self) -> String {
        self.page_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}?tab=repositories", self.username))
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_millis(self.scrape_timeout_ms)
    }

    pub fn background_api_timeout(&self) -> Duration {
        Duration::from_millis(self.background_api_timeout_ms)
    }

    pub fn background_scrape_timeout(&self) -> Duration {
        Duration::from_millis(self.background_scrape_timeout_ms)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot file override.
    pub path: Option<PathBuf>,
    /// Age after which the snapshot is reported as stale.
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            ttl_hours: 6,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(60 * 60))
    }
}

/// Resume download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub filename: String,
    pub path: PathBuf,
    pub download_delay_ms: u64,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            filename: "resume.pdf".to_string(),
            path: PathBuf::from("downloads/resume.pdf"),
            download_delay_ms: 1200,
        }
    }
}

impl ResumeConfig {
    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }
}

/// Timings for toasts, modals and the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub toast_ms: u64,
    pub modal_ms: u64,
    pub contact_send_ms: u64,
    pub status_hide_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ms: 3800,
            modal_ms: 3000,
            contact_send_ms: 1000,
            status_hide_ms: 5000,
        }
    }
}

impl UiConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    pub fn modal_duration(&self) -> Duration {
        Duration::from_millis(self.modal_ms)
    }

    pub fn contact_send_delay(&self) -> Duration {
        Duration::from_millis(self.contact_send_ms)
    }

    pub fn status_hide_delay(&self) -> Duration {
        Duration::from_millis(self.status_hide_ms)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub retention_hours: u32,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            retention_hours: 24,
        }
    }
}

/// Default config file location (`<config dir>/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "repofolio").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
