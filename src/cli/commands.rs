//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed arguments
//! and returns an `anyhow::Result<()>`.

use clap::{Parser, Subcommand};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use super::engine;
use crate::assets::HttpAssetLoader;
use crate::catalog::{CatalogApi, CatalogClient, CollectionKind, FixtureCatalog};
use crate::config::{self, Config};
use crate::error::{Error, ResultExt};
use crate::player::{ChannelBackend, TransportState};
use crate::session::{Session, SessionMessage};
use crate::view::SortKey;

/// How long the session must stay quiet before a command reports.
const QUIET_PERIOD: Duration = Duration::from_millis(400);

/// Playdeck CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List the tracks of a collection as the browse view shows them
    Browse {
        /// Collection id
        id: String,
        /// Collection kind: album, playlist or mix
        #[arg(short, long, default_value = "playlist")]
        kind: CollectionKind,
        /// Only show tracks whose title or artist contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Sort order: none, title, artist or album
        #[arg(short, long, default_value = "none")]
        sort: SortKey,
        /// Read the collection from a JSON file instead of the catalog
        #[arg(long)]
        file: Option<PathBuf>,
        /// Maximum number of pages to load
        #[arg(long, default_value_t = 3)]
        pages: usize,
    },
    /// Start playback from a collection and show the resulting queue
    Plan {
        /// Collection id
        id: String,
        /// Collection kind: album, playlist or mix
        #[arg(short, long, default_value = "playlist")]
        kind: CollectionKind,
        /// Display index to start from
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Start from a random track instead
        #[arg(long)]
        shuffle: bool,
        /// Only queue tracks whose title or artist contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Read the collection from a JSON file instead of the catalog
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show the configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Run a CLI command if one was specified.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if none was given.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };
    let rt = Runtime::new()?;
    let config = config::load();

    match command {
        Commands::Browse {
            id,
            kind,
            filter,
            sort,
            file,
            pages,
        } => cmd_browse(
            &rt,
            config,
            id,
            *kind,
            filter.as_deref(),
            *sort,
            file.as_deref(),
            *pages,
        )?,
        Commands::Plan {
            id,
            kind,
            start,
            shuffle,
            filter,
            file,
        } => cmd_plan(
            &rt,
            config,
            id,
            *kind,
            *start,
            *shuffle,
            filter.as_deref(),
            file.as_deref(),
        )?,
        Commands::Config { init } => cmd_config(&rt, config, *init)?,
    }
    Ok(true)
}

/// Everything a command needs to drive a session.
struct Harness {
    session: Session,
    rx: UnboundedReceiver<SessionMessage>,
    engine: std::thread::JoinHandle<()>,
}

impl Harness {
    fn new(config: Config, file: Option<&Path>) -> Self {
        let catalog: Arc<dyn CatalogApi> = match file {
            Some(path) => Arc::new(FixtureCatalog::new(path)),
            None => Arc::new(CatalogClient::new(
                config.catalog.base_url.clone(),
                config.pagination.page_size,
            )),
        };
        let state = Arc::new(RwLock::new(TransportState::default()));
        let (backend, commands) = ChannelBackend::new(Arc::clone(&state));
        let (session, rx) = Session::new(
            config,
            Arc::new(backend),
            catalog,
            Arc::new(HttpAssetLoader::new()),
        );
        let engine = engine::spawn(state, commands, session.sender());
        Self {
            session,
            rx,
            engine,
        }
    }

    fn send(&mut self, message: SessionMessage) {
        self.session.handle(message);
    }

    /// Handle messages until the session goes quiet.
    async fn settle(&mut self) {
        while let Ok(Some(message)) = tokio::time::timeout(QUIET_PERIOD, self.rx.recv()).await {
            self.session.handle(message);
        }
    }

    async fn open(&mut self, kind: CollectionKind, id: &str) -> crate::error::Result<()> {
        self.send(SessionMessage::OpenCollection {
            kind,
            id: id.to_string(),
        });
        self.settle().await;
        if self.session.header().is_none() {
            return Err(Error::invalid_input(format!("could not load {}", id)))
                .with_context("opening collection");
        }
        Ok(())
    }

    /// Scroll to the bottom until the collection is complete or `pages`
    /// pages are in.
    async fn load_pages(&mut self, pages: usize) {
        while self.session.pagination().pages_loaded() < pages
            && !self.session.pagination().is_complete()
        {
            let before = self.session.pagination().pages_loaded();
            self.send(SessionMessage::Scrolled {
                value: 1000.0,
                upper: 2000.0,
                page_size: 1000.0,
            });
            self.settle().await;
            if self.session.pagination().pages_loaded() == before {
                debug!("Page load made no progress, stopping");
                break;
            }
        }
    }

    fn shutdown(self) {
        let Self {
            mut session,
            engine,
            ..
        } = self;
        session.handle(SessionMessage::Shutdown);
        // Dropping the session closes the command channel
        drop(session);
        if engine.join().is_err() {
            tracing::warn!("Engine thread panicked");
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_browse(
    rt: &Runtime,
    config: Config,
    id: &str,
    kind: CollectionKind,
    filter: Option<&str>,
    sort: SortKey,
    file: Option<&Path>,
    pages: usize,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let mut harness = Harness::new(config, file);
        harness.open(kind, id).await?;
        harness.load_pages(pages).await;

        if let Some(text) = filter {
            harness.send(SessionMessage::SetFilter(text.to_string()));
        }
        harness.send(SessionMessage::SetSort(sort));

        let session = &harness.session;
        if let Some(header) = session.header() {
            println!("{}", header.title);
            if !header.meta.is_empty() {
                println!("{}", header.meta);
            }
            println!("{}", header.stats);
            if !header.description.is_empty() {
                println!("\n{}", header.description);
            }
            println!();
        }

        let view = session.view();
        for (i, track) in view.tracks().enumerate() {
            let marker = if view.is_playing(i) { "▶" } else { " " };
            println!(
                "{:>4} {} {} - {}  {}",
                i + 1,
                marker,
                track.title,
                track.artist,
                track.display_duration()
            );
        }

        info!(
            "{} of {} tracks shown ({} pages, complete: {})",
            view.len(),
            view.collection().len(),
            session.pagination().pages_loaded(),
            session.pagination().is_complete()
        );
        harness.shutdown();
        Ok::<_, anyhow::Error>(())
    })
}

#[allow(clippy::too_many_arguments)]
fn cmd_plan(
    rt: &Runtime,
    config: Config,
    id: &str,
    kind: CollectionKind,
    start: usize,
    shuffle: bool,
    filter: Option<&str>,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let mut harness = Harness::new(config, file);
        harness.open(kind, id).await?;
        if let Some(text) = filter {
            harness.send(SessionMessage::SetFilter(text.to_string()));
        }

        if start >= harness.session.view().len() && !shuffle {
            anyhow::bail!(
                "start index {} is outside the {} visible tracks",
                start,
                harness.session.view().len()
            );
        }
        harness.send(if shuffle {
            SessionMessage::ShuffleAll
        } else {
            SessionMessage::Activate(start)
        });
        harness.settle().await;

        let session = &harness.session;
        let queue = session.queue();
        let current = queue.current_index();
        println!(
            "Queue: {} tracks from {} (infinite: {}, complete: {})",
            queue.len(),
            queue.source_id().unwrap_or("?"),
            queue.is_infinite(),
            queue.is_complete()
        );
        for (i, track) in queue.items().iter().enumerate() {
            let marker = if Some(i) == current { "▶" } else { " " };
            println!("{:>4} {} {} - {}", i + 1, marker, track.title, track.artist);
        }

        let transport = session.transport();
        println!(
            "\nTransport: {:?} {} / {} (buffering: {})",
            transport.status,
            transport.position_str(),
            transport.duration_str(),
            transport.buffering
        );

        if let Some(plan) = session.last_plan() {
            println!(
                "Carousel: {} slots, scrolled to {:?}",
                plan.slot_count, plan.scroll_to
            );
        }
        let prefetcher = session.prefetcher();
        for i in 0..prefetcher.len() {
            let Some(slot) = prefetcher.slot(i) else {
                continue;
            };
            if let Some(url) = slot.primary_url() {
                let status = match slot.loaded_url() {
                    Some(loaded) if loaded == url => "loaded",
                    Some(_) => "fallback",
                    None if slot.is_loading() => "loading",
                    None => "placeholder",
                };
                println!("{:>4} {:<11} {}", i + 1, status, url);
            }
        }

        harness.shutdown();
        Ok::<_, anyhow::Error>(())
    })
}

fn cmd_config(rt: &Runtime, config: Config, init: bool) -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config directory)"),
    }
    println!("{}", toml::to_string_pretty(&config)?);

    if init {
        rt.block_on(config::save_async(config))
            .with_context("writing config file")?;
        println!("Configuration saved.");
    }
    Ok(())
}
