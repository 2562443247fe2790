// repofolio command line.
// Builds the portfolio page, runs the terminal preview, and drives the resume and contact actions.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::runtime::Runtime;
use tokio::sync::watch;

use repofolio::app::{App, Services};
use repofolio::cache::SnapshotStore;
use repofolio::config::Config;
use repofolio::fetch::{LoadMode, LoadOutcome, Orchestrator};
use repofolio::logging;
use repofolio::page::{Page, ResumeLink};
use repofolio::render::{PortfolioView, Renderer, format};
use repofolio::widgets::{
    ConsoleNotifier, ContactForm, ContactMessage, DownloadOutcome, ImageProbe, Launcher, Notifier,
    ResumeDownloader, SubmitOutcome, SuccessModal, SystemLauncher, ToastBanner,
};
use repofolio::{FolioError, Result};

#[derive(Debug, Parser)]
#[command(name = "repofolio", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load repositories and write the portfolio page
    Build {
        /// Page template (defaults to the built-in one)
        #[arg(long)]
        template: Option<PathBuf>,
        /// Output file, or `-` for stdout
        #[arg(long, default_value = "index.html")]
        out: PathBuf,
        /// Skip the snapshot and fetch fresh data
        #[arg(long)]
        refresh: bool,
    },
    /// Browse the portfolio in the terminal
    Preview {
        /// Skip the snapshot and fetch fresh data
        #[arg(long)]
        refresh: bool,
    },
    /// Open or save the resume
    Resume,
    /// Send a contact message
    Contact {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Inspect or delete the repository snapshot
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Show the snapshot's age and contents
    Show,
    /// Delete the snapshot
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if matches!(cli.command, Command::Preview { .. }) {
        // The screen belongs to the UI
        if let Some(path) = logging::init_file(&config.log, cli.debug)? {
            eprintln!("Logging to {}", path.display());
        }
    } else {
        logging::init_cli(&config.log, cli.debug);
    }

    let runtime = Runtime::new()?;

    match cli.command {
        Command::Build {
            template,
            out,
            refresh,
        } => build(&config, &runtime, template.as_deref(), &out, refresh),
        Command::Preview { refresh } => preview(&config, &runtime, refresh),
        Command::Resume => resume(&config, &runtime),
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => contact(
            &config,
            &runtime,
            ContactMessage {
                name,
                email,
                subject,
                message,
            },
        ),
        Command::Cache { action } => cache(&config, action),
    }
}

fn load_mode(refresh: bool) -> LoadMode {
    if refresh {
        LoadMode::ForceRefresh
    } else {
        LoadMode::Initial
    }
}

fn snapshot_store(config: &Config) -> Result<SnapshotStore> {
    SnapshotStore::at(config.cache.path.as_deref())
        .ok_or_else(|| FolioError::Other("no cache directory available".to_string()))
}

fn orchestrator(
    config: &Config,
    display: watch::Sender<PortfolioView>,
    notifier: Arc<dyn Notifier>,
) -> Result<Orchestrator> {
    let renderer = Renderer::new(Arc::new(display), config.github.max_repos);
    Orchestrator::from_config(&config.github, snapshot_store(config)?, renderer, notifier)
}

fn build(
    config: &Config,
    runtime: &Runtime,
    template: Option<&Path>,
    out: &Path,
    refresh: bool,
) -> Result<()> {
    let page = match template {
        Some(path) => Page::from_file(path)?,
        None => Page::builtin(),
    };
    let base_dir = template
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let (display, view) = watch::channel(PortfolioView::default());
    let orchestrator = orchestrator(config, display, Arc::clone(&notifier))?;
    let resume = ResumeLink {
        href: format::encode_uri_path(&config.resume.path.to_string_lossy()),
        filename: config.resume.filename.clone(),
    };

    let html = runtime.block_on(async {
        let outcome = orchestrator.load(load_mode(refresh)).await;
        if let LoadOutcome::Cached { refresh: handle } = outcome {
            // The page is static, so let the refresh land before writing it
            match handle.await {
                Ok(outcome) => tracing::info!("Background refresh: {:?}", outcome),
                Err(e) => tracing::warn!("Background refresh task failed: {}", e),
            }
        }

        let probe = ImageProbe::new(base_dir, config.github.api_timeout())?;
        let broken = probe
            .broken(&page.placeholder_images(), notifier.as_ref())
            .await;
        let view = view.borrow().clone();
        Ok::<_, FolioError>(page.assemble(&view, &resume, &broken))
    })?;

    if out == Path::new("-") {
        io::stdout().write_all(html.as_bytes())?;
    } else {
        fs::write(out, html)?;
        tracing::info!("Wrote {}", out.display());
    }
    Ok(())
}

fn preview(config: &Config, runtime: &Runtime, refresh: bool) -> Result<()> {
    let toasts = Arc::new(ToastBanner::new(config.ui.toast_duration()));
    let modal = Arc::new(SuccessModal::new(config.ui.modal_duration()));
    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher);
    let notifier: Arc<dyn Notifier> = toasts.clone();

    let (display, view) = watch::channel(PortfolioView::default());
    let services = Services {
        orchestrator: orchestrator(config, display, Arc::clone(&notifier))?,
        resume: ResumeDownloader::new(
            &config.resume,
            Arc::clone(&launcher),
            Arc::clone(&modal),
            Arc::clone(&notifier),
        ),
        contact: ContactForm::new(&config.ui, notifier),
        toasts,
        modal,
        launcher,
    };

    let mut app = App::new(services, view, runtime.handle().clone());
    app.load(load_mode(refresh));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}

fn resume(config: &Config, runtime: &Runtime) -> Result<()> {
    let downloader = ResumeDownloader::new(
        &config.resume,
        Arc::new(SystemLauncher),
        Arc::new(SuccessModal::new(config.ui.modal_duration())),
        Arc::new(ConsoleNotifier),
    );

    match runtime.block_on(downloader.download())? {
        DownloadOutcome::Opened => println!("Opened {}", config.resume.path.display()),
        DownloadOutcome::Saved(path) => println!("Saved {}", path.display()),
        DownloadOutcome::Busy => {}
    }
    Ok(())
}

fn contact(config: &Config, runtime: &Runtime, message: ContactMessage) -> Result<()> {
    let form = ContactForm::new(&config.ui, Arc::new(ConsoleNotifier));
    match runtime.block_on(form.submit(&message)) {
        SubmitOutcome::Sent(sent) => {
            tracing::debug!("Contact message from {} <{}>", sent.name, sent.email);
            Ok(())
        }
        SubmitOutcome::Invalid => Err(FolioError::Other(
            "contact message needs --name, --email, --subject and --message".to_string(),
        )),
        SubmitOutcome::Busy => Ok(()),
    }
}

fn cache(config: &Config, action: CacheAction) -> Result<()> {
    let store = snapshot_store(config)?;
    match action {
        CacheAction::Show => {
            println!("Snapshot: {}", store.path().display());
            let Some(snapshot) = store.load() else {
                println!("No snapshot saved.");
                return Ok(());
            };

            let age_hours = snapshot.age().as_secs() / 3600;
            let stale = if snapshot.is_expired(config.cache.ttl()) {
                " (stale)"
            } else {
                ""
            };
            println!(
                "Captured: {} ({}h ago){}",
                snapshot.captured_at().to_rfc3339(),
                age_hours,
                stale
            );
            println!("Repositories: {}", snapshot.repos.len());
            for repo in &snapshot.repos {
                println!("  {:<32} ⭐ {:>6}  {}", repo.name, format::format_count(repo.stars), repo.url);
            }
        }
        CacheAction::Clear => {
            if store.clear()? {
                println!("Removed {}", store.path().display());
            } else {
                println!("No snapshot to remove.");
            }
        }
    }
    Ok(())
}
