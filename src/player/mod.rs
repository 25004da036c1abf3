//! Playback-facing side of the core: queue, transport state and the
//! engine seam.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Session (single timeline)                  │
//! │   QueueModel decides what plays, TransportState mirrors engine  │
//! └──────────────┬───────────────────────────────▲──────────────────┘
//!                │ PlayerCommand                 │ PlaybackEvent
//!                ▼ (crossbeam channel)           │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Playback engine (external)                 │
//! │            Decodes, outputs audio, reports progress             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod queue;
mod state;

pub use queue::{Direction, QueueModel, RepeatMode};
pub use state::{
    NowPlaying, PlaybackEvent, PlaybackSignal, PlaybackStatus, PlayerCommand, TransportState,
    VolumeLevel, format_duration,
};

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::model::Track;

/// The playback engine as the core drives it.
///
/// Everything goes through [`send`](Self::send); the provided methods are
/// thin wrappers so call sites read like the engine's own API.
pub trait PlaybackBackend: Send + Sync {
    /// Deliver a command to the engine.
    fn send(&self, command: PlayerCommand) -> Result<(), PlayerError>;

    /// Last status the engine reported.
    fn status(&self) -> PlaybackStatus;

    /// Current volume (0.0 - 1.0).
    fn volume(&self) -> f32;

    fn load(&self, track: Arc<Track>) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Load(track))
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Play)
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Pause)
    }

    fn stop(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Stop)
    }

    fn seek(&self, position: Duration, flush: bool) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Seek { position, flush })
    }

    fn set_volume(&self, volume: f32) -> Result<(), PlayerError> {
        self.send(PlayerCommand::SetVolume(volume.clamp(0.0, 1.0)))
    }

    fn set_mute(&self, muted: bool) -> Result<(), PlayerError> {
        self.send(PlayerCommand::SetMute(muted))
    }
}

/// Backend that forwards commands over a channel.
///
/// The engine thread owns the receiving end and writes what it observes
/// into the shared [`TransportState`].
pub struct ChannelBackend {
    /// Current transport state (shared with the engine)
    state: Arc<RwLock<TransportState>>,
    /// Command sender to the engine
    command_tx: Sender<PlayerCommand>,
}

impl ChannelBackend {
    /// Create a backend and the receiver the engine should drain.
    pub fn new(state: Arc<RwLock<TransportState>>) -> (Self, Receiver<PlayerCommand>) {
        let (command_tx, command_rx) = bounded(32);
        (Self { state, command_tx }, command_rx)
    }
}

impl PlaybackBackend for ChannelBackend {
    fn send(&self, command: PlayerCommand) -> Result<(), PlayerError> {
        self.command_tx
            .send(command)
            .map_err(|_| PlayerError::ChannelClosed)
    }

    fn status(&self) -> PlaybackStatus {
        self.state.read().status
    }

    fn volume(&self) -> f32 {
        self.state.read().volume
    }
}

/// Player errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlayerError {
    #[error("Playback channel closed")]
    ChannelClosed,

    #[error("Track is not playable: {0}")]
    NotPlayable(String),
}
