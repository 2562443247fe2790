// App state and main event loop for the terminal preview.
// Keyboard input drives loads, resume downloads and the contact form on a tokio runtime.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::fetch::{LoadMode, Orchestrator};
use crate::render::PortfolioView;
use crate::state::{CardSelection, ContactDraft};
use crate::ui;
use crate::widgets::{
    ContactForm, Launcher, Notifier, ResumeDownloader, SubmitOutcome, SuccessModal, ToastBanner,
    ToastLevel,
};

/// What keyboard input currently drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Contact,
}

/// Everything the preview acts through.
pub struct Services {
    pub orchestrator: Orchestrator,
    pub resume: ResumeDownloader,
    pub contact: ContactForm,
    pub toasts: Arc<ToastBanner>,
    pub modal: Arc<SuccessModal>,
    pub launcher: Arc<dyn Launcher>,
}

/// Main application state.
pub struct App {
    pub view: watch::Receiver<PortfolioView>,
    pub selection: CardSelection,
    pub draft: ContactDraft,
    pub mode: Mode,
    pub show_help: bool,
    pub toasts: Arc<ToastBanner>,
    pub modal: Arc<SuccessModal>,
    pub contact: ContactForm,
    pub resume: ResumeDownloader,
    orchestrator: Orchestrator,
    launcher: Arc<dyn Launcher>,
    runtime: Handle,
    pending_submit: Option<JoinHandle<SubmitOutcome>>,
    /// Whether the app should exit.
    pub should_quit: bool,
}

impl App {
    pub fn new(services: Services, view: watch::Receiver<PortfolioView>, runtime: Handle) -> Self {
        Self {
            view,
            selection: CardSelection::new(),
            draft: ContactDraft::new(),
            mode: Mode::Browse,
            show_help: false,
            toasts: services.toasts,
            modal: services.modal,
            contact: services.contact,
            resume: services.resume,
            orchestrator: services.orchestrator,
            launcher: services.launcher,
            runtime,
            pending_submit: None,
            should_quit: false,
        }
    }

    /// Start a load in the background; the view updates when it lands.
    pub fn load(&self, mode: LoadMode) {
        let orchestrator = self.orchestrator.clone();
        self.runtime.spawn(async move {
            let outcome = orchestrator.load(mode).await;
            tracing::debug!("Load finished: {:?}", outcome);
        });
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            self.tick();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Number of cards currently shown.
    pub fn card_count(&self) -> usize {
        self.view
            .borrow()
            .state
            .data()
            .map_or(0, |grid| grid.cards.len())
    }

    /// Per-frame housekeeping: collect a finished send and keep the selection valid.
    pub fn tick(&mut self) {
        if self
            .pending_submit
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
        {
            if let Some(handle) = self.pending_submit.take() {
                match self.runtime.block_on(handle) {
                    Ok(SubmitOutcome::Sent(_)) => self.draft.reset(),
                    Ok(_) => {}
                    Err(e) => tracing::error!("Contact send task failed: {}", e),
                }
            }
        }

        self.selection.clamp(self.card_count());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Contact => self.handle_contact_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let len = self.card_count();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.load(LoadMode::ForceRefresh),
            KeyCode::Enter | KeyCode::Char('o') => self.open_selected(),
            KeyCode::Char('d') => self.download_resume(),
            KeyCode::Char('c') => self.mode = Mode::Contact,
            KeyCode::Down | KeyCode::Char('j') => self.selection.select_next(len),
            KeyCode::Up | KeyCode::Char('k') => self.selection.select_prev(len),
            KeyCode::Esc => {
                self.modal.dismiss();
                self.toasts.dismiss();
            }
            _ => {}
        }
    }

    fn handle_contact_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Tab | KeyCode::Down => self.draft.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.draft.focus_prev(),
            KeyCode::Backspace => self.draft.backspace(),
            KeyCode::Enter => self.submit_contact(),
            KeyCode::Char(c) => self.draft.insert(c),
            _ => {}
        }
    }

    /// URL of the selected card.
    pub fn selected_url(&self) -> Option<String> {
        let index = self.selection.selected()?;
        let view = self.view.borrow();
        let card = view.state.data()?.cards.get(index)?;
        (card.url != "#").then(|| card.url.clone())
    }

    fn open_selected(&self) {
        let Some(url) = self.selected_url() else {
            return;
        };
        // The opener may block; keep it off the UI thread.
        let launcher = Arc::clone(&self.launcher);
        let toasts = Arc::clone(&self.toasts);
        self.runtime.spawn_blocking(move || {
            if let Err(e) = launcher.open(&url) {
                tracing::warn!("Could not open {}: {}", url, e);
                toasts.notify(&format!("Could not open {}", url), ToastLevel::Error);
            }
        });
    }

    fn download_resume(&self) {
        if self.resume.is_busy() {
            return;
        }
        let resume = self.resume.clone();
        let toasts = Arc::clone(&self.toasts);
        self.runtime.spawn(async move {
            if let Err(e) = resume.download().await {
                tracing::error!("Resume download failed: {}", e);
                toasts.notify("Could not download resume.", ToastLevel::Error);
            }
        });
    }

    fn submit_contact(&mut self) {
        if self.pending_submit.is_some() {
            return;
        }
        let contact = self.contact.clone();
        let message = self.draft.message();
        self.pending_submit = Some(
            self.runtime
                .spawn(async move { contact.submit(&message).await }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SnapshotStore;
    use crate::config::{ResumeConfig, UiConfig};
    use crate::error::Result;
    use crate::github::RepoSummary;
    use crate::render::{DataOrigin, Renderer};
    use crate::state::ContactField;
    use crossterm::event::KeyModifiers;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::runtime::Runtime;

    #[derive(Default)]
    struct FakeLauncher {
        opened: Mutex<Vec<String>>,
    }

    impl Launcher for FakeLauncher {
        fn open(&self, target: &str) -> Result<()> {
            self.opened.lock().unwrap().push(target.to_string());
            Ok(())
        }
    }

    struct Fixture {
        _dir: TempDir,
        runtime: Runtime,
        renderer: Renderer,
        launcher: Arc<FakeLauncher>,
        app: App,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let runtime = Runtime::new().unwrap();
        let (tx, rx) = watch::channel(PortfolioView::default());
        let renderer = Renderer::new(Arc::new(tx), 8);
        let toasts = Arc::new(ToastBanner::new(Duration::from_secs(4)));
        let modal = Arc::new(SuccessModal::new(Duration::from_secs(3)));
        let launcher = Arc::new(FakeLauncher::default());

        let orchestrator = Orchestrator::new(
            SnapshotStore::new(dir.path().join("snap.json")),
            renderer.clone(),
            toasts.clone(),
            Duration::from_millis(100),
        );
        let resume = ResumeDownloader::new(
            &ResumeConfig::default(),
            launcher.clone(),
            modal.clone(),
            toasts.clone(),
        );
        let ui = UiConfig {
            contact_send_ms: 10,
            ..UiConfig::default()
        };
        let contact = ContactForm::new(&ui, toasts.clone());

        let services = Services {
            orchestrator,
            resume,
            contact,
            toasts,
            modal,
            launcher: launcher.clone(),
        };
        let app = App::new(services, rx, runtime.handle().clone());

        Fixture {
            _dir: dir,
            runtime,
            renderer,
            launcher,
            app,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn repos(count: usize) -> Vec<RepoSummary> {
        (0..count)
            .map(|i| RepoSummary {
                name: format!("r{}", i),
                url: format!("https://github.com/u/r{}", i),
                ..RepoSummary::default()
            })
            .collect()
    }

    #[test]
    fn test_quit_and_help() {
        let mut f = fixture();
        f.app.handle_key(key(KeyCode::Char('?')));
        assert!(f.app.show_help);

        // Keys are swallowed while help is open.
        f.app.handle_key(key(KeyCode::Char('q')));
        assert!(!f.app.should_quit);

        f.app.handle_key(key(KeyCode::Esc));
        f.app.handle_key(key(KeyCode::Char('q')));
        assert!(f.app.should_quit);
    }

    #[test]
    fn test_selection_and_open() {
        let mut f = fixture();
        f.renderer.render_list(&repos(3), DataOrigin::Fresh);
        f.app.tick();
        assert_eq!(f.app.selection.selected(), Some(0));

        f.app.handle_key(key(KeyCode::Down));
        f.app.handle_key(key(KeyCode::Enter));

        // Opening happens on the blocking pool.
        f.runtime.block_on(async {
            for _ in 0..100 {
                if !f.launcher.opened.lock().unwrap().is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
        assert_eq!(
            *f.launcher.opened.lock().unwrap(),
            ["https://github.com/u/r1"]
        );
    }

    #[test]
    fn test_contact_mode_typing_and_escape() {
        let mut f = fixture();
        f.app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(f.app.mode, Mode::Contact);

        // 'q' is text inside the form.
        f.app.handle_key(key(KeyCode::Char('q')));
        f.app.handle_key(key(KeyCode::Tab));
        f.app.handle_key(key(KeyCode::Char('e')));
        assert!(!f.app.should_quit);
        assert_eq!(f.app.draft.value(ContactField::Name), "q");
        assert_eq!(f.app.draft.value(ContactField::Email), "e");

        f.app.handle_key(key(KeyCode::Esc));
        assert_eq!(f.app.mode, Mode::Browse);
    }

    #[test]
    fn test_contact_submit_resets_draft() {
        let mut f = fixture();
        f.app.handle_key(key(KeyCode::Char('c')));
        for field in ["Ada", "ada@example.com", "Hi", "Hello"] {
            for c in field.chars() {
                f.app.handle_key(key(KeyCode::Char(c)));
            }
            f.app.handle_key(key(KeyCode::Tab));
        }
        f.app.handle_key(key(KeyCode::Enter));

        f.runtime.block_on(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
        });
        f.app.tick();

        assert_eq!(f.app.draft.value(ContactField::Name), "");
        assert!(f.app.contact.status().is_some());
        assert!(f.app.toasts.visible().is_some());
    }

    #[test]
    fn test_refresh_without_sources_shows_error() {
        let mut f = fixture();
        f.app.handle_key(key(KeyCode::Char('r')));

        f.runtime.block_on(async {
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        assert!(f.app.view.borrow().state.is_error());
        let toast = f.app.toasts.visible().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
    }
}
