//! Player state, events and command types.

use std::sync::Arc;
use std::time::Duration;

use crate::model::{LikeStatus, Track};

/// Current playback status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Loading,
    Playing,
    Paused,
}

/// State change reported by the playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    Loading,
    Playing,
    Paused,
    Stopped,
    /// The queue changed shape or position; views should resync
    QueueUpdated,
}

impl PlaybackSignal {
    /// The status this signal moves to, if any.
    pub fn status(self) -> Option<PlaybackStatus> {
        match self {
            Self::Loading => Some(PlaybackStatus::Loading),
            Self::Playing => Some(PlaybackStatus::Playing),
            Self::Paused => Some(PlaybackStatus::Paused),
            Self::Stopped => Some(PlaybackStatus::Stopped),
            Self::QueueUpdated => None,
        }
    }
}

/// Metadata of the track the engine is now playing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub thumbnail_url: Option<String>,
    pub id: Option<String>,
    pub like_status: LikeStatus,
}

/// Events emitted by the playback engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Progression { position: Duration, duration: Duration },
    StateChanged(PlaybackSignal),
    MetadataChanged(NowPlaying),
    VolumeChanged { volume: f32, muted: bool },
}

/// Commands sent to the playback engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Load a track, replacing whatever is loaded
    Load(Arc<Track>),
    /// Start/resume playback
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Seek to an absolute position; `flush` drops buffered audio
    Seek { position: Duration, flush: bool },
    /// Set volume (0.0 - 1.0)
    SetVolume(f32),
    SetMute(bool),
    /// Shutdown the engine
    Shutdown,
}

/// Coarse volume level for the speaker icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

/// Transport state as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportState {
    pub status: PlaybackStatus,
    pub position: Duration,
    pub duration: Duration,
    /// Volume level (0.0 - 1.0)
    pub volume: f32,
    pub muted: bool,
    /// Spinner shown instead of the play icon
    pub buffering: bool,
    pub now_playing: Option<NowPlaying>,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
            muted: false,
            buffering: false,
            now_playing: None,
        }
    }
}

impl TransportState {
    /// Show loading immediately when a new track is requested.
    pub fn begin_load(&mut self) {
        self.status = PlaybackStatus::Loading;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.buffering = true;
    }

    /// Fold an engine event into the state.
    pub fn apply(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::Progression { position, duration } => {
                self.position = *position;
                self.duration = *duration;
                if self.buffering
                    && !duration.is_zero()
                    && self.status == PlaybackStatus::Playing
                {
                    self.buffering = false;
                }
            }
            PlaybackEvent::StateChanged(signal) => {
                let Some(status) = signal.status() else {
                    return;
                };
                self.status = status;
                self.buffering = match status {
                    PlaybackStatus::Loading => true,
                    // Playing without a duration is still buffering the stream
                    PlaybackStatus::Playing => self.duration.is_zero(),
                    PlaybackStatus::Paused | PlaybackStatus::Stopped => false,
                };
            }
            PlaybackEvent::MetadataChanged(now_playing) => {
                self.now_playing = Some(now_playing.clone());
            }
            PlaybackEvent::VolumeChanged { volume, muted } => {
                // Ignore echoes of our own slider moves
                if (self.volume - volume).abs() > 0.01 {
                    self.volume = *volume;
                }
                self.muted = *muted;
            }
        }
    }

    /// Whether the play button should accept input.
    pub fn controls_enabled(&self) -> bool {
        !self.buffering
    }

    /// Whether seeking makes sense right now.
    pub fn can_seek(&self) -> bool {
        !self.duration.is_zero()
    }

    /// Get position as a fraction (0.0 - 1.0).
    pub fn position_fraction(&self) -> f32 {
        if self.duration.is_zero() {
            0.0
        } else {
            self.position.as_secs_f32() / self.duration.as_secs_f32()
        }
    }

    /// Format position as MM:SS.
    pub fn position_str(&self) -> String {
        format_duration(self.position)
    }

    /// Format duration as MM:SS.
    pub fn duration_str(&self) -> String {
        format_duration(self.duration)
    }

    pub fn volume_level(&self) -> VolumeLevel {
        if self.muted || self.volume <= 0.0 {
            VolumeLevel::Muted
        } else if self.volume < 0.33 {
            VolumeLevel::Low
        } else if self.volume < 0.66 {
            VolumeLevel::Medium
        } else {
            VolumeLevel::High
        }
    }
}

/// Format a duration as MM:SS or HH:MM:SS.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
