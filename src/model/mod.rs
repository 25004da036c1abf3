//! Core data models for browsing and playback.
//!
//! Defines [`Track`], the immutable snapshot every other component
//! references, and [`TrackCollection`], the ordered store the view
//! pipeline is built on.

mod collection;

pub use collection::TrackCollection;

use crate::player::format_duration;
use std::time::Duration;

/// Rating the user has given a track on the catalog side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikeStatus {
    Like,
    Dislike,
    #[default]
    Indifferent,
}

impl LikeStatus {
    /// Parse the catalog's wire value (`LIKE`, `DISLIKE`, `INDIFFERENT`).
    ///
    /// Unknown values map to [`LikeStatus::Indifferent`].
    pub fn from_wire(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "LIKE" => Self::Like,
            "DISLIKE" => Self::Dislike,
            _ => Self::Indifferent,
        }
    }
}

/// A track as seen by the browsing core.
///
/// Tracks are never mutated after ingestion. Per-view state such as the
/// playing flag lives in [`TrackCollection`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    /// Catalog id. `None` marks a non-playable placeholder row.
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Duration in seconds, when the catalog reports it numerically
    pub duration_seconds: Option<u32>,
    /// Preformatted duration from the catalog (used when seconds are missing)
    pub duration_text: Option<String>,
    /// Nominal thumbnail URL (lowest resolution the catalog reported)
    pub thumbnail: Option<String>,
    pub like_status: LikeStatus,
    /// Position at ingestion time, stable for one load session
    pub source_index: usize,
}

impl Track {
    /// Whether this row can be handed to the playback engine.
    pub fn is_playable(&self) -> bool {
        self.id.is_some()
    }

    /// Whether this track carries the given catalog id.
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    /// Duration for display, `m:ss`.
    pub fn display_duration(&self) -> String {
        match self.duration_seconds {
            Some(secs) if secs > 0 => format_duration(Duration::from_secs(u64::from(secs))),
            _ => self.duration_text.clone().unwrap_or_default(),
        }
    }
}
