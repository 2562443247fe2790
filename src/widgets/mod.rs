// Peripheral page widgets.
// Toasts, the success modal, resume download, contact form and image fallback.

pub mod contact;
pub mod images;
pub mod modal;
pub mod resume;
pub mod toast;

pub use contact::{ContactForm, ContactMessage, FormStatus, SubmitOutcome};
pub use images::{ImageProbe, PLACEHOLDER_ATTR, PLACEHOLDER_CLASS, placeholder_uri};
pub use modal::SuccessModal;
pub use resume::{DownloadOutcome, Launcher, ResumeDownloader, SystemLauncher};
pub use toast::{ConsoleNotifier, Notifier, Toast, ToastBanner, ToastLevel};
