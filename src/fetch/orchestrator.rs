// Fetch orchestrator.
// Serves the snapshot first when it can, otherwise races every source against one deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::cache::SnapshotStore;
use crate::config::GitHubConfig;
use crate::error::Result;
use crate::github::{ApiSource, GitHubClient};
use crate::render::{DataOrigin, Renderer};
use crate::scrape::ScrapeSource;
use crate::widgets::{Notifier, ToastLevel};

use super::RepoSource;
use super::race::race_first_non_empty;

pub const STALE_FALLBACK_MESSAGE: &str = "Using cached repositories (fresh fetch failed).";
pub const FETCH_FAILED_MESSAGE: &str = "Could not fetch GitHub repositories.";

/// How a load was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Page load: a snapshot is shown right away if one exists.
    Initial,
    /// Manual refresh: always fetch.
    ForceRefresh,
}

/// Per-source timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Used while racing.
    pub race: Duration,
    /// Used by the background refresh behind a cached render.
    pub background: Duration,
}

/// Result of one load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Snapshot rendered; a refresh runs in the background.
    Cached { refresh: JoinHandle<RefreshOutcome> },
    /// Fresh data rendered and saved.
    Fresh { count: usize },
    /// Every source failed; the snapshot was rendered with a warning.
    StaleFallback { count: usize },
    /// Every source failed and there was no snapshot.
    Failed,
}

/// Result of a background refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { source: &'static str, count: usize },
    Unchanged,
}

struct SourceSlot {
    source: Arc<dyn RepoSource>,
    timeouts: Timeouts,
}

/// Coordinates the snapshot, the sources and the renderer.
#[derive(Clone)]
pub struct Orchestrator {
    sources: Arc<Vec<SourceSlot>>,
    store: SnapshotStore,
    renderer: Renderer,
    notifier: Arc<dyn Notifier>,
    overall_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        store: SnapshotStore,
        renderer: Renderer,
        notifier: Arc<dyn Notifier>,
        overall_timeout: Duration,
    ) -> Self {
        Self {
            sources: Arc::new(Vec::new()),
            store,
            renderer,
            notifier,
            overall_timeout,
        }
    }

    /// Orchestrator with the API source and, if enabled, the page scraper.
    pub fn from_config(
        config: &GitHubConfig,
        store: SnapshotStore,
        renderer: Renderer,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = GitHubClient::new()?;
        let api = ApiSource::new(client, config.api_url(), config.max_repos);

        let mut orchestrator = Self::new(store, renderer, notifier, config.overall_timeout())
            .with_source(
                Arc::new(api),
                Timeouts {
                    race: config.api_timeout(),
                    background: config.background_api_timeout(),
                },
            );

        if config.scrape_enabled {
            let scraper =
                ScrapeSource::new(config.page_url(), config.proxies.clone(), config.max_repos)?;
            orchestrator = orchestrator.with_source(
                Arc::new(scraper),
                Timeouts {
                    race: config.scrape_timeout(),
                    background: config.background_scrape_timeout(),
                },
            );
        }

        Ok(orchestrator)
    }

    /// Append a source. Order matters for the background refresh, not for the race.
    pub fn with_source(mut self, source: Arc<dyn RepoSource>, timeouts: Timeouts) -> Self {
        let mut sources: Vec<SourceSlot> = match Arc::try_unwrap(self.sources) {
            Ok(sources) => sources,
            Err(shared) => shared
                .iter()
                .map(|slot| SourceSlot {
                    source: Arc::clone(&slot.source),
                    timeouts: slot.timeouts,
                })
                .collect(),
        };
        sources.push(SourceSlot { source, timeouts });
        self.sources = Arc::new(sources);
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one load. The refresh indicator is on for the duration of the call.
    pub async fn load(&self, mode: LoadMode) -> LoadOutcome {
        self.renderer.set_refreshing(true);
        let outcome = self.run(mode).await;
        self.renderer.set_refreshing(false);
        outcome
    }

    async fn run(&self, mode: LoadMode) -> LoadOutcome {
        let cached = self.store.load();

        if mode == LoadMode::Initial {
            if let Some(snapshot) = &cached {
                tracing::info!(
                    "Serving {} cached repositories ({}s old), refreshing in background",
                    snapshot.repos.len(),
                    snapshot.age().as_secs()
                );
                self.renderer.render_list(
                    &snapshot.repos,
                    DataOrigin::Cached {
                        captured_at: snapshot.captured_at(),
                    },
                );

                let this = self.clone();
                let refresh = tokio::spawn(async move { this.background_refresh().await });
                return LoadOutcome::Cached { refresh };
            }
        }

        self.renderer.show_loading();

        let tasks = self
            .sources
            .iter()
            .map(|slot| slot.source.fetch(slot.timeouts.race));

        if let Some(repos) = race_first_non_empty(tasks, self.overall_timeout).await {
            tracing::info!("Fetched {} repositories", repos.len());
            self.renderer.render_list(&repos, DataOrigin::Fresh);
            self.store.save(&repos);
            return LoadOutcome::Fresh { count: repos.len() };
        }

        match cached {
            Some(snapshot) => {
                tracing::warn!("All sources failed, falling back to snapshot");
                self.renderer.render_list(
                    &snapshot.repos,
                    DataOrigin::Cached {
                        captured_at: snapshot.captured_at(),
                    },
                );
                self.notifier.notify(STALE_FALLBACK_MESSAGE, ToastLevel::Warn);
                LoadOutcome::StaleFallback {
                    count: snapshot.repos.len(),
                }
            }
            None => {
                tracing::error!("All sources failed and no snapshot is available");
                self.renderer.show_error();
                self.notifier.notify(FETCH_FAILED_MESSAGE, ToastLevel::Error);
                LoadOutcome::Failed
            }
        }
    }

    /// Try each source in order; the first non-empty result is saved and rendered.
    /// On total failure the current render is left alone.
    pub async fn background_refresh(&self) -> RefreshOutcome {
        for slot in self.sources.iter() {
            let Some(repos) = slot.source.fetch(slot.timeouts.background).await else {
                continue;
            };
            if repos.is_empty() {
                continue;
            }

            tracing::info!(
                "Background refresh via {} returned {} repositories",
                slot.source.name(),
                repos.len()
            );
            self.store.save(&repos);
            self.renderer.render_list(&repos, DataOrigin::Fresh);
            return RefreshOutcome::Updated {
                source: slot.source.name(),
                count: repos.len(),
            };
        }

        tracing::debug!("Background refresh found nothing new");
        RefreshOutcome::Unchanged
    }
}
