// Renderer for the repository grid.
// Turns repository lists into cards and pushes display states to an injected surface.

pub mod card;
pub mod format;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::github::RepoSummary;
use crate::state::LoadingState;

pub use card::{Card, LanguageBadge, MAX_TOPICS};
pub use format::{escape_html, format_count, freshness_label, language_color};

/// Message for the error/empty state.
pub const ERROR_MESSAGE: &str = "Could not load repositories right now.";

/// Where a rendered list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Fresh,
    Cached { captured_at: DateTime<Utc> },
}

/// Populated grid: the cards plus the freshness badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub cards: Vec<Card>,
    pub badge: String,
    pub from_cache: bool,
}

/// Everything a display surface shows for the portfolio section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioView {
    pub state: LoadingState<Grid>,
    /// A load is in flight (the refresh control's busy indicator).
    pub refreshing: bool,
}

/// A surface that shows the portfolio section. Later calls replace earlier ones.
pub trait Display: Send + Sync {
    fn present(&self, state: LoadingState<Grid>);
    fn set_refreshing(&self, refreshing: bool);
}

impl Display for watch::Sender<PortfolioView> {
    fn present(&self, state: LoadingState<Grid>) {
        self.send_modify(|view| view.state = state);
    }

    fn set_refreshing(&self, refreshing: bool) {
        self.send_modify(|view| view.refreshing = refreshing);
    }
}

/// Builds display states from repository lists.
#[derive(Clone)]
pub struct Renderer {
    display: Arc<dyn Display>,
    max_repos: usize,
}

impl Renderer {
    pub fn new(display: Arc<dyn Display>, max_repos: usize) -> Self {
        Self { display, max_repos }
    }

    /// Show `repos` as cards, or the error state when there are none.
    pub fn render_list(&self, repos: &[RepoSummary], origin: DataOrigin) {
        if repos.is_empty() {
            self.show_error();
            return;
        }

        let cards = repos
            .iter()
            .take(self.max_repos)
            .map(Card::from_repo)
            .collect();

        let captured_at = match &origin {
            DataOrigin::Fresh => None,
            DataOrigin::Cached { captured_at } => Some(captured_at),
        };
        let badge = freshness_label(captured_at, &Utc::now());

        self.display.present(LoadingState::Loaded(Grid {
            cards,
            badge,
            from_cache: captured_at.is_some(),
        }));
    }

    pub fn show_loading(&self) {
        self.display.present(LoadingState::Loading);
    }

    pub fn show_error(&self) {
        self.display.present(LoadingState::Error(ERROR_MESSAGE.to_string()));
    }

    pub fn set_refreshing(&self, refreshing: bool) {
        self.display.set_refreshing(refreshing);
    }
}
