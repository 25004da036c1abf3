//! Dry-run playback engine for the command line.
//!
//! Drains [`PlayerCommand`]s on its own thread, pretends every load
//! succeeds instantly and reports back the events a real engine would.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use crate::player::{NowPlaying, PlaybackEvent, PlaybackSignal, PlayerCommand, TransportState};
use crate::session::SessionMessage;

/// Start the engine thread. It exits when the command channel closes or on
/// [`PlayerCommand::Shutdown`].
pub fn spawn(
    state: Arc<RwLock<TransportState>>,
    commands: Receiver<PlayerCommand>,
    events: UnboundedSender<SessionMessage>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for command in commands.iter() {
            tracing::debug!("Engine command: {:?}", command);
            if command == PlayerCommand::Shutdown {
                break;
            }
            for event in respond(&state, command) {
                state.write().apply(&event);
                if events.send(SessionMessage::Playback(event)).is_err() {
                    return;
                }
            }
        }
        tracing::debug!("Engine stopped");
    })
}

fn respond(state: &RwLock<TransportState>, command: PlayerCommand) -> Vec<PlaybackEvent> {
    match command {
        PlayerCommand::Load(track) => {
            let duration = Duration::from_secs(u64::from(track.duration_seconds.unwrap_or(0)));
            state.write().duration = duration;
            vec![
                PlaybackEvent::StateChanged(PlaybackSignal::Loading),
                PlaybackEvent::MetadataChanged(NowPlaying {
                    title: track.title.clone(),
                    artist: track.artist.clone(),
                    thumbnail_url: track.thumbnail.clone(),
                    id: track.id.clone(),
                    like_status: track.like_status,
                }),
            ]
        }
        PlayerCommand::Play => {
            let duration = state.read().duration;
            vec![
                PlaybackEvent::StateChanged(PlaybackSignal::Playing),
                PlaybackEvent::Progression {
                    position: Duration::ZERO,
                    duration,
                },
            ]
        }
        PlayerCommand::Pause => vec![PlaybackEvent::StateChanged(PlaybackSignal::Paused)],
        PlayerCommand::Stop => vec![PlaybackEvent::StateChanged(PlaybackSignal::Stopped)],
        PlayerCommand::Seek { position, .. } => {
            let duration = state.read().duration;
            vec![PlaybackEvent::Progression {
                position: position.min(duration),
                duration,
            }]
        }
        PlayerCommand::SetVolume(volume) => {
            let muted = state.read().muted;
            vec![PlaybackEvent::VolumeChanged { volume, muted }]
        }
        PlayerCommand::SetMute(muted) => {
            let volume = state.read().volume;
            vec![PlaybackEvent::VolumeChanged { volume, muted }]
        }
        PlayerCommand::Shutdown => Vec::new(),
    }
}
