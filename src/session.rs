//! The browsing/playback session.
//!
//! One [`Session`] owns the view, the queue, the cursor reconciler, the
//! artwork window and the pagination state. Every input (user action,
//! engine event, finished fetch, timer) arrives as a [`SessionMessage`] and
//! is applied by [`Session::handle`] in one step, so no two mutations ever
//! interleave. Background work (catalog fetches, artwork loads, settle
//! timers) runs on tokio tasks that post their result back as a message.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::assets::{AssetLoader, LoadRequest, LoadedAsset, WindowedPrefetcher, load_with_fallbacks};
use crate::catalog::{CatalogApi, CatalogError, CollectionHeader, CollectionKind, CollectionPage};
use crate::config::Config;
use crate::model::Track;
use crate::pagination::{FetchRequest, PaginationController};
use crate::player::{
    Direction, PlaybackBackend, PlaybackEvent, PlaybackSignal, PlaybackStatus, PlayerError,
    QueueModel, TransportState,
};
use crate::sync::{PositionOutcome, PositionReconciler, ReleaseToken, SwipeGate, SyncPlan};
use crate::view::{QueueRequest, SortKey, ViewPipeline};

/// Everything that can happen to a session.
#[derive(Debug)]
pub enum SessionMessage {
    /// Event reported by the playback engine
    Playback(PlaybackEvent),
    /// Browse a collection
    OpenCollection { kind: CollectionKind, id: String },
    SetFilter(String),
    SetSort(SortKey),
    /// Row activated in the view (display index)
    Activate(usize),
    PlayAll,
    ShuffleAll,
    Advance(Direction),
    /// Carousel position reported by the presentation
    CursorMoved(f64),
    /// Fling on the compact player bar
    Fling { vx: f64, vy: f64 },
    /// Collection list scrolled
    Scrolled { value: f64, upper: f64, page_size: f64 },
    TogglePlay,
    SetVolume(f32),
    ToggleMute,
    Seek(Duration),
    CycleRepeat,
    /// Settle timer for a programmatic cursor move fired
    ReleaseCursor(ReleaseToken),
    PageLoaded {
        request: FetchRequest,
        result: Result<CollectionPage, CatalogError>,
    },
    AssetLoaded {
        slot: usize,
        ticket: u64,
        asset: Option<LoadedAsset>,
    },
    Shutdown,
}

/// Single logical timeline for browsing and playback.
pub struct Session {
    config: Config,
    view: ViewPipeline,
    pagination: PaginationController,
    header: Option<CollectionHeader>,
    show_header_title: bool,
    queue: QueueModel,
    reconciler: PositionReconciler,
    prefetcher: WindowedPrefetcher,
    swipe: SwipeGate,
    transport: TransportState,
    last_plan: Option<SyncPlan>,
    backend: Arc<dyn PlaybackBackend>,
    catalog: Arc<dyn CatalogApi>,
    assets: Arc<dyn AssetLoader>,
    tx: UnboundedSender<SessionMessage>,
}

impl Session {
    /// Create a session and the receiver its messages arrive on.
    pub fn new(
        config: Config,
        backend: Arc<dyn PlaybackBackend>,
        catalog: Arc<dyn CatalogApi>,
        assets: Arc<dyn AssetLoader>,
    ) -> (Self, UnboundedReceiver<SessionMessage>) {
        let (tx, rx) = unbounded_channel();
        let session = Self {
            view: ViewPipeline::default(),
            pagination: PaginationController::new(
                config.pagination.load_more_threshold,
                config.pagination.header_title_threshold,
            ),
            header: None,
            show_header_title: false,
            queue: QueueModel::new(),
            reconciler: PositionReconciler::new(config.sync.slot_epsilon),
            prefetcher: WindowedPrefetcher::new(config.prefetch.window_radius),
            swipe: SwipeGate::new(config.sync.swipe_min_velocity, config.sync.swipe_cooldown()),
            // Start from what the engine already reports
            transport: TransportState {
                status: backend.status(),
                volume: backend.volume(),
                ..TransportState::default()
            },
            last_plan: None,
            backend,
            catalog,
            assets,
            tx,
            config,
        };
        (session, rx)
    }

    /// Handle for posting messages from elsewhere.
    pub fn sender(&self) -> UnboundedSender<SessionMessage> {
        self.tx.clone()
    }

    /// Process messages until [`SessionMessage::Shutdown`].
    pub async fn run(mut self, mut rx: UnboundedReceiver<SessionMessage>) {
        tracing::debug!("Session started");
        while let Some(message) = rx.recv().await {
            if !self.handle(message) {
                break;
            }
        }
        tracing::debug!("Session stopped");
    }

    /// Apply one message. Returns `false` once the session should stop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle(&mut self, message: SessionMessage) -> bool {
        match message {
            SessionMessage::Playback(event) => self.on_playback_event(event),
            SessionMessage::OpenCollection { kind, id } => self.open_collection(kind, id),
            SessionMessage::SetFilter(text) => self.view.set_filter(&text),
            SessionMessage::SetSort(key) => self.view.set_sort(key),
            SessionMessage::Activate(index) => {
                if let Some(request) = self.view.activate_at(index) {
                    self.play_request(request);
                }
            }
            SessionMessage::PlayAll => {
                if let Some(request) = self.view.play_all() {
                    self.play_request(request);
                }
            }
            SessionMessage::ShuffleAll => {
                if let Some(request) = self.view.shuffle_all() {
                    self.play_request(request);
                }
            }
            SessionMessage::Advance(direction) => self.advance(direction),
            SessionMessage::CursorMoved(position) => self.on_cursor_moved(position),
            SessionMessage::Fling { vx, vy } => {
                if let Some(direction) = self.swipe.on_fling(vx, vy, Instant::now()) {
                    self.advance(direction);
                }
            }
            SessionMessage::Scrolled {
                value,
                upper,
                page_size,
            } => {
                let outcome = self.pagination.on_scroll(value, upper, page_size);
                self.show_header_title = outcome.show_header_title;
                if outcome.load_more {
                    self.fetch_next_page();
                }
            }
            SessionMessage::TogglePlay => self.toggle_play(),
            SessionMessage::SetVolume(volume) => {
                self.transport.volume = volume.clamp(0.0, 1.0);
                self.report(self.backend.set_volume(volume));
            }
            SessionMessage::ToggleMute => {
                self.transport.muted = !self.transport.muted;
                self.report(self.backend.set_mute(self.transport.muted));
            }
            SessionMessage::Seek(position) => {
                if self.transport.can_seek() {
                    self.report(self.backend.seek(position, true));
                }
            }
            SessionMessage::CycleRepeat => self.queue.cycle_repeat(),
            SessionMessage::ReleaseCursor(token) => {
                self.reconciler.release(token);
            }
            SessionMessage::PageLoaded { request, result } => self.on_page_loaded(request, result),
            SessionMessage::AssetLoaded {
                slot,
                ticket,
                asset,
            } => {
                self.prefetcher.complete(slot, ticket, asset);
            }
            SessionMessage::Shutdown => {
                self.report(self.backend.stop());
                return false;
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Browsing
    // ------------------------------------------------------------------

    fn open_collection(&mut self, kind: CollectionKind, id: String) {
        tracing::info!("Opening {:?} {}", kind, id);
        let playing = self.playing_id();
        self.view.reset(kind, id.clone());
        self.view.mark_playing(playing.as_deref());
        self.pagination.reset(id, kind);
        self.header = None;
        self.show_header_title = false;
        self.fetch_next_page();
    }

    fn fetch_next_page(&mut self) {
        let Some(request) = self.pagination.begin_fetch() else {
            return;
        };
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = catalog
                .fetch_collection(
                    request.kind,
                    &request.collection_id,
                    request.page_token.as_deref(),
                )
                .await;
            let _ = tx.send(SessionMessage::PageLoaded { request, result });
        });
    }

    fn on_page_loaded(&mut self, request: FetchRequest, result: Result<CollectionPage, CatalogError>) {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.pagination.fail(&request, &e);
                return;
            }
        };
        if !self.pagination.finish(&request, &page) {
            return;
        }

        if !request.append {
            self.header = Some(page.header(request.kind));
            self.view.replace(page.tracks);
            tracing::debug!(
                "Loaded {} tracks of {}",
                self.view.collection().len(),
                request.collection_id
            );
            return;
        }

        let added = self.view.merge_page(page.offset, page.tracks);
        tracing::debug!("Appended {} tracks to {}", added.len(), request.collection_id);

        if !self.queue_follows(&request.collection_id, added.start) {
            return;
        }
        if !added.is_empty() {
            let appended: Vec<Arc<Track>> = self.view.collection().tracks()[added].to_vec();
            self.queue.extend(appended);
            self.sync_program();
        }
        if self.pagination.is_complete() {
            self.queue.mark_complete();
        }
    }

    /// Whether new pages of `source_id` belong on the queue: the queue must
    /// hold exactly the first `loaded` tracks of the collection, in order.
    fn queue_follows(&self, source_id: &str, loaded: usize) -> bool {
        self.queue.source_id() == Some(source_id)
            && self.view.filter_text().is_empty()
            && self.view.sort_key() == SortKey::None
            && self.queue.mirrors(&self.view.collection().tracks()[..loaded])
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    fn play_request(&mut self, request: QueueRequest) {
        let QueueRequest {
            tracks,
            start_index,
            shuffle,
            source_id,
            is_infinite,
        } = request;

        let started = self
            .queue
            .set_queue(tracks, start_index, shuffle, source_id, is_infinite)
            .is_some();
        if !started {
            self.prefetcher.resize(0);
            return;
        }
        tracing::info!(
            "Queue replaced: {} tracks from {}",
            self.queue.len(),
            self.queue.source_id().unwrap_or("?")
        );
        if self.pagination.is_complete() && self.queue.source_id() == self.view.source_id() {
            self.queue.mark_complete();
        }

        self.start_current();
        self.sync_program();
    }

    fn advance(&mut self, direction: Direction) {
        if self.queue.advance(direction).is_none() {
            tracing::debug!("No track to move to ({:?})", direction);
            return;
        }
        self.start_current();
        self.sync_program();
    }

    fn toggle_play(&mut self) {
        if !self.transport.controls_enabled() {
            return;
        }
        match self.transport.status {
            PlaybackStatus::Playing => self.report(self.backend.pause()),
            PlaybackStatus::Paused => self.report(self.backend.play()),
            PlaybackStatus::Stopped => self.start_current(),
            PlaybackStatus::Loading => {}
        }
    }

    /// Load and play the queue's current track.
    fn start_current(&mut self) {
        let Some(track) = self.queue.current().cloned() else {
            return;
        };
        let result = self.play_track(track);
        self.report(result);
    }

    fn play_track(&mut self, track: Arc<Track>) -> Result<(), PlayerError> {
        if !track.is_playable() {
            return Err(PlayerError::NotPlayable(track.title.clone()));
        }
        self.transport.begin_load();
        self.backend.load(track)?;
        self.backend.play()
    }

    fn playing_id(&self) -> Option<String> {
        self.transport.now_playing.as_ref().and_then(|np| np.id.clone())
    }

    fn report(&self, result: Result<(), PlayerError>) {
        if let Err(e) = result {
            tracing::error!("Playback command failed: {}", e);
        }
    }

    fn on_playback_event(&mut self, event: PlaybackEvent) {
        self.transport.apply(&event);
        match event {
            PlaybackEvent::MetadataChanged(now_playing) => {
                self.view.mark_playing(now_playing.id.as_deref());

                // The engine moved on by itself (end of track, remote control)
                if let Some(id) = now_playing.id.as_deref() {
                    let on_track = self.queue.current().is_some_and(|t| t.has_id(id));
                    if !on_track && let Some(index) = self.queue.position_of(id) {
                        self.queue.jump_to(index);
                    }
                }
                self.sync_program();
            }
            PlaybackEvent::StateChanged(PlaybackSignal::QueueUpdated) => self.sync_program(),
            PlaybackEvent::StateChanged(_)
            | PlaybackEvent::Progression { .. }
            | PlaybackEvent::VolumeChanged { .. } => {}
        }
    }

    // ------------------------------------------------------------------
    // Cursor and artwork
    // ------------------------------------------------------------------

    fn on_cursor_moved(&mut self, position: f64) {
        let outcome = self.reconciler.on_position_changed(
            position,
            self.queue.current_index(),
            self.queue.len(),
        );
        match outcome {
            PositionOutcome::Discarded => {}
            PositionOutcome::Preview { center } | PositionOutcome::Settled { index: center } => {
                self.prefetch_around(center);
            }
            PositionOutcome::Jump { index } => {
                tracing::debug!("Cursor jump to {}", index);
                self.queue.jump_to(index);
                self.start_current();
                self.sync_program();
            }
        }
    }

    /// Move the cursor to the queue's current track without it counting
    /// as user input, and refresh artwork around it.
    fn sync_program(&mut self) {
        let Some(plan) = self
            .reconciler
            .sync_to_queue(self.queue.len(), self.queue.current_index())
        else {
            return;
        };
        self.last_plan = Some(plan);

        self.prefetcher.resize(plan.slot_count);
        self.prefetcher.invalidate();
        if let Some(center) = plan.scroll_to {
            self.prefetch_around(center);
        }

        let tx = self.tx.clone();
        let delay = self.config.sync.settle_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionMessage::ReleaseCursor(plan.token));
        });
    }

    fn prefetch_around(&mut self, center: usize) {
        let active = self.queue.current_index();
        let items = self.queue.items();
        let requests = self.prefetcher.recompute(center, active, |i| {
            items.get(i).and_then(|t| t.thumbnail.as_deref())
        });

        for LoadRequest {
            slot,
            ticket,
            target,
            ..
        } in requests
        {
            let loader = Arc::clone(&self.assets);
            let tx = self.tx.clone();
            let task = tokio::spawn(async move {
                let asset = load_with_fallbacks(loader.as_ref(), &target).await;
                let _ = tx.send(SessionMessage::AssetLoaded {
                    slot,
                    ticket,
                    asset,
                });
            });
            self.prefetcher.attach(slot, ticket, task.abort_handle());
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn view(&self) -> &ViewPipeline {
        &self.view
    }

    pub fn queue(&self) -> &QueueModel {
        &self.queue
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn reconciler(&self) -> &PositionReconciler {
        &self.reconciler
    }

    pub fn prefetcher(&self) -> &WindowedPrefetcher {
        &self.prefetcher
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn header(&self) -> Option<&CollectionHeader> {
        self.header.as_ref()
    }

    pub fn show_header_title(&self) -> bool {
        self.show_header_title
    }

    /// Last programmatic cursor move, for the presentation to perform.
    pub fn last_plan(&self) -> Option<SyncPlan> {
        self.last_plan
    }
}
