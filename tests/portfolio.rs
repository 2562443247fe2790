// End-to-end page builds through the public API.
// A local HTTP server stands in for the repository API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;

use repofolio::cache::{CacheSnapshot, SnapshotStore};
use repofolio::config::GitHubConfig;
use repofolio::fetch::{LoadMode, LoadOutcome, Orchestrator, RefreshOutcome};
use repofolio::github::RepoSummary;
use repofolio::page::{Page, ResumeLink};
use repofolio::render::{PortfolioView, Renderer};
use repofolio::widgets::{Notifier, ToastLevel};

const REPOS_JSON: &str = r#"[
    {"name": "older", "html_url": "https://github.com/u/older", "description": "Old work",
     "language": "Rust", "stargazers_count": 3, "forks_count": 0,
     "pushed_at": "2023-01-01T00:00:00Z", "topics": []},
    {"name": "pyproj", "html_url": "https://github.com/u/pyproj", "description": "<script>x</script>",
     "language": "Python", "stargazers_count": 1500, "forks_count": 12,
     "pushed_at": "2024-06-01T00:00:00Z", "topics": ["ml", "data"]}
]"#;

#[derive(Default)]
struct Recorded(Mutex<Vec<(String, ToastLevel)>>);

impl Notifier for Recorded {
    fn notify(&self, message: &str, level: ToastLevel) {
        self.0.lock().unwrap().push((message.to_string(), level));
    }
}

/// Answers every connection with `body` as JSON.
async fn serve_json(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });
    addr
}

/// An address nothing listens on.
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn github_config(api: SocketAddr) -> GitHubConfig {
    GitHubConfig {
        username: "u".to_string(),
        api_url: Some(format!("http://{}/users/u/repos", api)),
        scrape_enabled: false,
        api_timeout_ms: 1000,
        background_api_timeout_ms: 1000,
        overall_timeout_ms: 2000,
        ..GitHubConfig::default()
    }
}

fn resume() -> ResumeLink {
    ResumeLink {
        href: "downloads/resume.pdf".to_string(),
        filename: "resume.pdf".to_string(),
    }
}

#[tokio::test]
async fn fresh_build_renders_api_repositories() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshot.json"));
    let api = serve_json(REPOS_JSON).await;

    let (display, view) = watch::channel(PortfolioView::default());
    let notifier = Arc::new(Recorded::default());
    let config = github_config(api);
    let orchestrator = Orchestrator::from_config(
        &config,
        store.clone(),
        Renderer::new(Arc::new(display), config.max_repos),
        notifier.clone(),
    )
    .unwrap();

    let outcome = orchestrator.load(LoadMode::Initial).await;
    assert!(matches!(outcome, LoadOutcome::Fresh { count: 2 }));

    let html = Page::builtin().assemble(&view.borrow(), &resume(), &[]);
    assert!(html.contains("1.5k"));
    assert!(html.contains("#3572A5"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>x"));
    assert!(!html.contains("cached"));
    let newest = html.find("https://github.com/u/pyproj").unwrap();
    let oldest = html.find("https://github.com/u/older").unwrap();
    assert!(newest < oldest);
    assert!(html.contains(r#"href="downloads/resume.pdf""#));

    let saved = store.load().unwrap();
    assert_eq!(saved.repos.len(), 2);
    assert!(notifier.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stale_snapshot_survives_unreachable_network() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshot.json"));
    let snapshot = CacheSnapshot {
        ts: chrono::Utc::now().timestamp_millis() - 7 * 60 * 60 * 1000,
        repos: vec![RepoSummary {
            name: "kept".to_string(),
            url: "https://github.com/u/kept".to_string(),
            ..RepoSummary::default()
        }],
    };
    std::fs::write(store.path(), serde_json::to_string(&snapshot).unwrap()).unwrap();

    let (display, view) = watch::channel(PortfolioView::default());
    let notifier = Arc::new(Recorded::default());
    let config = github_config(closed_addr().await);
    let orchestrator = Orchestrator::from_config(
        &config,
        store.clone(),
        Renderer::new(Arc::new(display), config.max_repos),
        notifier.clone(),
    )
    .unwrap();

    let LoadOutcome::Cached { refresh } = orchestrator.load(LoadMode::Initial).await else {
        panic!("expected the snapshot to be served");
    };
    assert_eq!(refresh.await.unwrap(), RefreshOutcome::Unchanged);

    let html = Page::builtin().assemble(&view.borrow(), &resume(), &[]);
    assert!(html.contains("cached: 7h ago"));
    assert!(html.contains("https://github.com/u/kept"));

    // A forced refresh falls back to the same snapshot with one warning.
    let outcome = orchestrator.load(LoadMode::ForceRefresh).await;
    assert!(matches!(outcome, LoadOutcome::StaleFallback { count: 1 }));
    let toasts = notifier.0.lock().unwrap().clone();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].1, ToastLevel::Warn);
    assert_eq!(store.load().unwrap(), snapshot);
}

#[tokio::test]
async fn total_failure_without_snapshot_shows_error() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshot.json"));

    let (display, view) = watch::channel(PortfolioView::default());
    let notifier = Arc::new(Recorded::default());
    let config = github_config(closed_addr().await);
    let orchestrator = Orchestrator::from_config(
        &config,
        store,
        Renderer::new(Arc::new(display), config.max_repos),
        notifier.clone(),
    )
    .unwrap();

    assert!(matches!(
        orchestrator.load(LoadMode::Initial).await,
        LoadOutcome::Failed
    ));
    assert!(view.borrow().state.is_error());
    assert!(!view.borrow().refreshing);

    let toasts = notifier.0.lock().unwrap().clone();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].1, ToastLevel::Error);
}
