// Toast notifications.
// One reusable banner: a new toast replaces the message and restarts the dismiss timer.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warn,
    Error,
}

impl ToastLevel {
    /// Banner background colour.
    pub fn color(&self) -> &'static str {
        match self {
            ToastLevel::Info => "#3498db",
            ToastLevel::Success => "#27ae60",
            ToastLevel::Warn => "#f39c12",
            ToastLevel::Error => "#e74c3c",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToastLevel::Info => "info",
            ToastLevel::Success => "success",
            ToastLevel::Warn => "warn",
            ToastLevel::Error => "error",
        }
    }
}

/// Receives user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: ToastLevel);
}

/// A toast currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

/// The single banner element.
#[derive(Debug)]
pub struct ToastBanner {
    current: Mutex<Option<Toast>>,
    duration: Duration,
}

impl ToastBanner {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: Mutex::new(None),
            duration,
        }
    }

    pub fn show(&self, message: impl Into<String>, level: ToastLevel) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(Toast {
                message: message.into(),
                level,
                shown_at: Instant::now(),
            });
        }
    }

    /// The toast still within its display window at `now`.
    pub fn visible_at(&self, now: Instant) -> Option<Toast> {
        let current = self.current.lock().ok()?;
        current
            .as_ref()
            .filter(|toast| now.saturating_duration_since(toast.shown_at) < self.duration)
            .cloned()
    }

    pub fn visible(&self) -> Option<Toast> {
        self.visible_at(Instant::now())
    }

    pub fn dismiss(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}

impl Notifier for ToastBanner {
    fn notify(&self, message: &str, level: ToastLevel) {
        tracing::debug!("toast ({}): {}", level.label(), message);
        self.show(message, level);
    }
}

/// Notifier for command-line runs: writes each toast to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        match level {
            ToastLevel::Info | ToastLevel::Success => tracing::info!("{}", message),
            ToastLevel::Warn => tracing::warn!("{}", message),
            ToastLevel::Error => tracing::error!("{}", message),
        }
        eprintln!("[{}] {}", level.label(), message);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_visible_until_duration() {
        let banner = ToastBanner::new(Duration::from_millis(3800));
        banner.show("Saved", ToastLevel::Success);

        let toast = banner.visible().unwrap();
        assert_eq!(toast.message, "Saved");
        assert_eq!(toast.level.color(), "#27ae60");

        let later = toast.shown_at + Duration::from_millis(3800);
        assert!(banner.visible_at(later).is_none());
    }

    #[test]
    fn test_new_toast_replaces_and_restarts_timer() {
        let banner = ToastBanner::new(Duration::from_secs(3));
        banner.show("first", ToastLevel::Info);
        let first = banner.visible().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        banner.notify("second", ToastLevel::Error);
        let second = banner.visible().unwrap();

        assert_eq!(second.message, "second");
        assert_eq!(second.level, ToastLevel::Error);
        assert!(second.shown_at > first.shown_at);
        // Still visible past the first toast's expiry.
        assert!(banner.visible_at(first.shown_at + Duration::from_secs(3)).is_some());
    }

    #[test]
    fn test_dismiss() {
        let banner = ToastBanner::new(Duration::from_secs(3));
        banner.show("x", ToastLevel::Warn);
        banner.dismiss();
        assert!(banner.visible().is_none());
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(ToastLevel::Info.color(), "#3498db");
        assert_eq!(ToastLevel::Warn.color(), "#f39c12");
        assert_eq!(ToastLevel::Error.color(), "#e74c3c");
    }
}
