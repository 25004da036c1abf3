//! Play queue management.

use rand::Rng;
use std::sync::Arc;

use crate::model::Track;

/// Direction for [`QueueModel::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Repeat mode for the queue. Also decides what happens at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop at the first/last track
    #[default]
    Off,
    /// Wrap around the ends
    All,
    /// Stay on the current track
    One,
}

/// The play queue with current position tracking.
///
/// Replaced wholesale by [`set_queue`](Self::set_queue); every other method
/// mutates in place. The current index is always inside the queue when set.
#[derive(Debug, Clone, Default)]
pub struct QueueModel {
    /// All items in the queue
    items: Vec<Arc<Track>>,
    /// Current position in the queue (`None` = nothing active)
    position: Option<usize>,
    /// Collection the queue was built from
    source_id: Option<String>,
    /// Source keeps producing tracks (mixes)
    is_infinite: bool,
    /// Source has no more pages
    is_complete: bool,
    repeat: RepeatMode,
}

impl QueueModel {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get queue length.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Get all items in the queue.
    pub fn items(&self) -> &[Arc<Track>] {
        &self.items
    }

    /// Get current position.
    pub fn current_index(&self) -> Option<usize> {
        self.position.filter(|&p| p < self.items.len())
    }

    /// Get current item.
    pub fn current(&self) -> Option<&Arc<Track>> {
        self.current_index().and_then(|i| self.items.get(i))
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn is_infinite(&self) -> bool {
        self.is_infinite
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Replace the whole queue.
    ///
    /// With `shuffle` and no start index a random track is chosen. A start
    /// index past the end is clamped to the last track.
    pub fn set_queue(
        &mut self,
        tracks: Vec<Arc<Track>>,
        start_index: Option<usize>,
        shuffle: bool,
        source_id: Option<String>,
        is_infinite: bool,
    ) -> Option<&Arc<Track>> {
        let position = if tracks.is_empty() {
            None
        } else {
            match start_index {
                Some(i) => Some(i.min(tracks.len() - 1)),
                None if shuffle => Some(rand::rng().random_range(0..tracks.len())),
                None => Some(0),
            }
        };

        // Build the whole new state before swapping it in
        *self = Self {
            items: tracks,
            position,
            source_id,
            is_infinite,
            is_complete: false,
            repeat: self.repeat,
        };

        self.current()
    }

    /// Step to the next or previous track.
    ///
    /// Returns `None` when [`RepeatMode::Off`] hits an edge; the position is
    /// left where it was.
    pub fn advance(&mut self, direction: Direction) -> Option<&Arc<Track>> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();

        let Some(current) = self.current_index() else {
            // Not started: either direction starts at the top
            self.position = Some(0);
            return self.current();
        };

        let next = match (self.repeat, direction) {
            (RepeatMode::One, _) => current,
            (RepeatMode::All, Direction::Next) => (current + 1) % len,
            (RepeatMode::All, Direction::Previous) => (current + len - 1) % len,
            (RepeatMode::Off, Direction::Next) => {
                if current + 1 >= len {
                    return None; // End of queue
                }
                current + 1
            }
            (RepeatMode::Off, Direction::Previous) => {
                if current == 0 {
                    return None; // Start of queue
                }
                current - 1
            }
        };

        self.position = Some(next);
        self.current()
    }

    /// Jump to a specific position.
    ///
    /// An out-of-range index is a caller bug: it asserts in debug builds and
    /// is clamped to the last track otherwise.
    pub fn jump_to(&mut self, index: usize) -> Option<&Arc<Track>> {
        if self.items.is_empty() {
            return None;
        }
        debug_assert!(
            index < self.items.len(),
            "jump_to({}) on queue of {}",
            index,
            self.items.len()
        );
        self.position = Some(index.min(self.items.len() - 1));
        self.current()
    }

    /// Append tracks from the queue's own source.
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Arc<Track>>) {
        self.items.extend(tracks);
    }

    /// Whether the queue holds exactly `tracks`, in order.
    ///
    /// Tracks match by identity or by id, so a reloaded collection still
    /// counts.
    pub fn mirrors(&self, tracks: &[Arc<Track>]) -> bool {
        self.items.len() == tracks.len()
            && self
                .items
                .iter()
                .zip(tracks)
                .all(|(a, b)| Arc::ptr_eq(a, b) || (a.id.is_some() && a.id == b.id))
    }

    /// Record that the source has no more pages. Ignored for infinite sources.
    pub fn mark_complete(&mut self) {
        if self.is_infinite {
            tracing::debug!("Ignoring completion for infinite queue");
            return;
        }
        self.is_complete = true;
    }

    /// Position of the first track with the given id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|t| t.has_id(id))
    }

    /// Cycle repeat mode.
    pub fn cycle_repeat(&mut self) {
        self.repeat = match self.repeat {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        };
    }

    /// Set repeat mode.
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Get repeat mode.
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }
}
