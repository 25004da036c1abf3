//! Ordered track storage with identity-based playing flags.

use std::ops::Range;
use std::sync::Arc;

use super::Track;

/// Ordered tracks for one loaded collection.
///
/// Append-only except for a full [`replace`](Self::replace). Every ingested
/// track gets `source_index` equal to its position, so indices stay stable
/// and monotonic for the lifetime of a load session.
#[derive(Debug, Clone, Default)]
pub struct TrackCollection {
    tracks: Vec<Arc<Track>>,
    /// Playing flag per track, parallel to `tracks`
    playing: Vec<bool>,
    /// Id reported by the last metadata change
    active_id: Option<String>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }

    /// Drop everything and start a new load session.
    ///
    /// The active id survives so a freshly opened collection still shows
    /// which of its tracks is playing.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks.clear();
        self.playing.clear();
        self.push_all(tracks);
    }

    /// Merge a page whose first track sits at `offset` in the full listing.
    ///
    /// Tracks below the current length were already ingested and are
    /// skipped, so delivering the same page twice is harmless. Returns the
    /// range of newly appended indices.
    pub fn merge_page(&mut self, offset: usize, tracks: Vec<Track>) -> Range<usize> {
        let start = self.tracks.len();
        if offset > start {
            tracing::warn!(
                "Page offset {} is past collection end {}, appending anyway",
                offset,
                start
            );
        }
        let overlap = start.saturating_sub(offset);
        self.push_all(tracks.into_iter().skip(overlap).collect());
        start..self.tracks.len()
    }

    fn push_all(&mut self, tracks: Vec<Track>) {
        for mut track in tracks {
            track.source_index = self.tracks.len();
            let playing = match (&self.active_id, &track.id) {
                (Some(active), Some(id)) => active == id,
                _ => false,
            };
            self.tracks.push(Arc::new(track));
            self.playing.push(playing);
        }
    }

    /// Flag every track whose id equals `id` as playing and clear the rest.
    pub fn set_active(&mut self, id: Option<&str>) {
        self.active_id = id.map(str::to_string);
        for (track, playing) in self.tracks.iter().zip(self.playing.iter_mut()) {
            *playing = match id {
                Some(id) => track.has_id(id),
                None => false,
            };
        }
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn is_playing(&self, index: usize) -> bool {
        self.playing.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_track;

    #[test]
    fn test_replace_assigns_source_index() {
        let mut collection = TrackCollection::new();
        collection.replace(vec![mock_track("a", "A", "x"), mock_track("b", "B", "y")]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.tracks()[0].source_index, 0);
        assert_eq!(collection.tracks()[1].source_index, 1);
    }

    #[test]
    fn test_merge_page_skips_already_ingested() {
        let mut collection = TrackCollection::new();
        collection.replace(vec![mock_track("a", "A", "x"), mock_track("b", "B", "y")]);

        // Page starting at 1 overlaps one track
        let added = collection.merge_page(1, vec![mock_track("b", "B", "y"), mock_track("c", "C", "z")]);
        assert_eq!(added, 2..3);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.tracks()[2].title, "C");
        assert_eq!(collection.tracks()[2].source_index, 2);

        // Same page delivered again is a no-op
        let added = collection.merge_page(1, vec![mock_track("b", "B", "y"), mock_track("c", "C", "z")]);
        assert!(added.is_empty());
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_set_active_by_identity() {
        let mut collection = TrackCollection::new();
        collection.replace(vec![
            mock_track("a", "A", "x"),
            mock_track("b", "B", "y"),
            mock_track("a", "A again", "x"),
        ]);

        collection.set_active(Some("a"));
        assert!(collection.is_playing(0));
        assert!(!collection.is_playing(1));
        assert!(collection.is_playing(2));

        collection.set_active(None);
        assert!((0..3).all(|i| !collection.is_playing(i)));
    }

    #[test]
    fn test_appended_tracks_pick_up_active_id() {
        let mut collection = TrackCollection::new();
        collection.replace(vec![mock_track("a", "A", "x")]);
        collection.set_active(Some("c"));

        collection.merge_page(1, vec![mock_track("c", "C", "z")]);
        assert!(collection.is_playing(1));
        assert!(!collection.is_playing(0));
    }
}
