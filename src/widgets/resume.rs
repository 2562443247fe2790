// Resume download.
// Opens the resume with the system opener, falling back to a copy in the download directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use directories::UserDirs;
use tokio::fs;

use crate::config::ResumeConfig;
use crate::error::{FolioError, Result};

use super::modal::SuccessModal;
use super::toast::{Notifier, ToastLevel};

pub const OPENED_MESSAGE: &str = "Opening resume...";
pub const DOWNLOADED_MESSAGE: &str = "Resume download started.";

/// Opens files and links outside the program.
///
/// `open` may block until the opener exits; async callers run it on the
/// blocking pool.
pub trait Launcher: Send + Sync {
    fn open(&self, target: &str) -> Result<()>;
}

/// Launcher backed by the platform's default opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, target: &str) -> Result<()> {
        let status = opener_command(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(FolioError::Other(format!(
                "opener exited with {} for {}",
                status, target
            )))
        }
    }
}

#[cfg(target_os = "macos")]
fn opener_command(target: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(target);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(target: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", target]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(target: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(target);
    command
}

/// How a download request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Handed to the system opener.
    Opened,
    /// Copied into the download directory.
    Saved(PathBuf),
    /// A download was already in progress; the trigger is disabled.
    Busy,
}

/// The resume download action shared by every trigger.
#[derive(Clone)]
pub struct ResumeDownloader {
    path: PathBuf,
    filename: String,
    delay: Duration,
    download_dir: Option<PathBuf>,
    launcher: Arc<dyn Launcher>,
    modal: Arc<SuccessModal>,
    notifier: Arc<dyn Notifier>,
    busy: Arc<AtomicBool>,
}

impl ResumeDownloader {
    pub fn new(
        config: &ResumeConfig,
        launcher: Arc<dyn Launcher>,
        modal: Arc<SuccessModal>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            path: config.path.clone(),
            filename: config.filename.clone(),
            delay: config.download_delay(),
            download_dir: default_download_dir(),
            launcher,
            modal,
            notifier,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override where the fallback copy is written.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// The trigger is disabled while a download is pending.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Wait out the delay, then open or save the resume.
    pub async fn download(&self) -> Result<DownloadOutcome> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Ok(DownloadOutcome::Busy);
        }
        // Re-enables the trigger even if this future is dropped mid-delay.
        let guard = BusyGuard(Arc::clone(&self.busy));

        tokio::time::sleep(self.delay).await;
        let result = self.deliver().await;
        drop(guard);

        let outcome = result?;
        let message = match &outcome {
            DownloadOutcome::Opened => OPENED_MESSAGE,
            _ => DOWNLOADED_MESSAGE,
        };
        self.modal.show();
        self.notifier.notify(message, ToastLevel::Success);
        Ok(outcome)
    }

    async fn deliver(&self) -> Result<DownloadOutcome> {
        let target = self.path.to_string_lossy().into_owned();
        let launcher = Arc::clone(&self.launcher);
        let opened = {
            let target = target.clone();
            tokio::task::spawn_blocking(move || launcher.open(&target))
                .await
                .map_err(|e| FolioError::Other(format!("opener task failed: {}", e)))?
        };
        match opened {
            Ok(()) => {
                tracing::info!("Opened resume {}", target);
                return Ok(DownloadOutcome::Opened);
            }
            Err(e) => tracing::warn!("Could not open resume, saving a copy instead: {}", e),
        }

        let dir = self
            .download_dir
            .clone()
            .ok_or_else(|| FolioError::Other("no download directory available".to_string()))?;
        let saved = save_copy(&self.path, &dir, &self.filename).await?;
        tracing::info!("Saved resume to {}", saved.display());
        Ok(DownloadOutcome::Saved(saved))
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn default_download_dir() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(
        dirs.download_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dirs.home_dir().to_path_buf()),
    )
}

async fn save_copy(source: &Path, dir: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let destination = dir.join(filename);
    fs::copy(source, &destination).await?;
    Ok(destination)
}
