// Success modal.
// Shown after a resume download; hides itself after a fixed time or when dismissed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct SuccessModal {
    shown_at: Mutex<Option<Instant>>,
    duration: Duration,
}

impl SuccessModal {
    pub fn new(duration: Duration) -> Self {
        Self {
            shown_at: Mutex::new(None),
            duration,
        }
    }

    /// Show the modal, restarting its timer if already visible.
    pub fn show(&self) {
        if let Ok(mut shown_at) = self.shown_at.lock() {
            *shown_at = Some(Instant::now());
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        self.shown_at
            .lock()
            .ok()
            .and_then(|shown_at| *shown_at)
            .is_some_and(|shown_at| now.saturating_duration_since(shown_at) < self.duration)
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }

    pub fn dismiss(&self) {
        if let Ok(mut shown_at) = self.shown_at.lock() {
            *shown_at = None;
        }
    }
}
