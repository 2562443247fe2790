// Contact form.
// Validates the four required fields and simulates sending; nothing leaves the machine.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::UiConfig;

use super::toast::{Notifier, ToastLevel};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";
pub const SENT_MESSAGE: &str = "Message sent successfully!";

/// A contact message as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Every field is non-blank.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.subject, &self.message]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Status line under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Error(String),
    Success(String),
}

impl FormStatus {
    pub fn message(&self) -> &str {
        match self {
            FormStatus::Error(message) | FormStatus::Success(message) => message,
        }
    }
}

#[derive(Debug)]
struct ShownStatus {
    status: FormStatus,
    shown_at: Instant,
    auto_hide: bool,
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A field was blank; the error status is showing.
    Invalid,
    /// A send is already in progress.
    Busy,
    /// Sent; the caller should reset its inputs.
    Sent(ContactMessage),
}

/// Contact form controller.
#[derive(Clone)]
pub struct ContactForm {
    status: Arc<Mutex<Option<ShownStatus>>>,
    sending: Arc<AtomicBool>,
    send_delay: Duration,
    hide_delay: Duration,
    notifier: Arc<dyn Notifier>,
}

impl ContactForm {
    pub fn new(config: &UiConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            status: Arc::new(Mutex::new(None)),
            sending: Arc::new(AtomicBool::new(false)),
            send_delay: config.contact_send_delay(),
            hide_delay: config.status_hide_delay(),
            notifier,
        }
    }

    /// The submit button is disabled while sending.
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// Validate and simulate sending `message`.
    pub async fn submit(&self, message: &ContactMessage) -> SubmitOutcome {
        let message = message.trimmed();
        if !message.is_complete() {
            self.set_status(FormStatus::Error(MISSING_FIELDS_MESSAGE.to_string()), false);
            return SubmitOutcome::Invalid;
        }

        if self.sending.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::Busy;
        }
        self.clear_status();

        tokio::time::sleep(self.send_delay).await;
        tracing::info!(
            "Contact message from {} <{}>: {}",
            message.name,
            message.email,
            message.subject
        );

        self.set_status(FormStatus::Success(SENT_MESSAGE.to_string()), true);
        self.notifier.notify(SENT_MESSAGE, ToastLevel::Success);
        self.sending.store(false, Ordering::SeqCst);
        SubmitOutcome::Sent(message)
    }

    /// Status showing at `now`. Success hides itself after the configured delay.
    pub fn status_at(&self, now: Instant) -> Option<FormStatus> {
        let status = self.status.lock().ok()?;
        status
            .as_ref()
            .filter(|shown| {
                !shown.auto_hide || now.saturating_duration_since(shown.shown_at) < self.hide_delay
            })
            .map(|shown| shown.status.clone())
    }

    pub fn status(&self) -> Option<FormStatus> {
        self.status_at(Instant::now())
    }

    fn set_status(&self, status: FormStatus, auto_hide: bool) {
        if let Ok(mut current) = self.status.lock() {
            *current = Some(ShownStatus {
                status,
                shown_at: Instant::now(),
                auto_hide,
            });
        }
    }

    fn clear_status(&self) {
        if let Ok(mut current) = self.status.lock() {
            *current = None;
        }
    }
}
