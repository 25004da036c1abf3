//! Filtered, sorted view over a track collection.
//!
//! The derived order is rebuilt from scratch on every filter or sort change,
//! so it only ever depends on (collection, filter text, sort key). Play and
//! shuffle act on what the view currently shows, not on the raw collection.

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use crate::catalog::{Capabilities, CollectionKind};
use crate::model::{Track, TrackCollection};

/// Sort order offered by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Collection order
    #[default]
    None,
    TitleAsc,
    ArtistAsc,
    AlbumAsc,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "default" => Ok(Self::None),
            "title" => Ok(Self::TitleAsc),
            "artist" => Ok(Self::ArtistAsc),
            "album" => Ok(Self::AlbumAsc),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// Request to replace the play queue with the visible tracks.
#[derive(Debug, Clone)]
pub struct QueueRequest {
    pub tracks: Vec<Arc<Track>>,
    /// `None` lets shuffle pick the start
    pub start_index: Option<usize>,
    pub shuffle: bool,
    pub source_id: Option<String>,
    pub is_infinite: bool,
}

/// Live view over one collection.
#[derive(Debug, Clone)]
pub struct ViewPipeline {
    collection: TrackCollection,
    kind: CollectionKind,
    source_id: Option<String>,
    filter_text: String,
    sort_key: SortKey,
    /// Collection indices in display order
    derived: Vec<usize>,
}

impl Default for ViewPipeline {
    fn default() -> Self {
        Self::new(CollectionKind::default())
    }
}

impl ViewPipeline {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            collection: TrackCollection::new(),
            kind,
            source_id: None,
            filter_text: String::new(),
            sort_key: SortKey::None,
            derived: Vec::new(),
        }
    }

    /// Switch to a different collection. Clears tracks, filter and sort.
    pub fn reset(&mut self, kind: CollectionKind, source_id: impl Into<String>) {
        let active = self.collection.active_id().map(str::to_string);
        self.collection = TrackCollection::new();
        self.collection.set_active(active.as_deref());
        self.kind = kind;
        self.source_id = Some(source_id.into());
        self.filter_text.clear();
        self.sort_key = SortKey::None;
        self.derived.clear();
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn collection(&self) -> &TrackCollection {
        &self.collection
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Number of visible tracks.
    pub fn len(&self) -> usize {
        self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }

    /// Visible track at a display position.
    pub fn get(&self, derived_index: usize) -> Option<&Arc<Track>> {
        self.derived
            .get(derived_index)
            .and_then(|&i| self.collection.get(i))
    }

    /// Visible tracks in display order.
    pub fn tracks(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.derived.iter().filter_map(|&i| self.collection.get(i))
    }

    /// Whether the visible track at `derived_index` is the one playing.
    pub fn is_playing(&self, derived_index: usize) -> bool {
        self.derived
            .get(derived_index)
            .is_some_and(|&i| self.collection.is_playing(i))
    }

    /// Set the filter text and rebuild.
    pub fn set_filter(&mut self, text: &str) {
        self.filter_text = text.trim().to_string();
        self.recompute();
    }

    /// Set the sort key and rebuild. Ignored for kinds without sorting.
    pub fn set_sort(&mut self, key: SortKey) {
        if !self.capabilities().supports_sort && key != SortKey::None {
            tracing::debug!("Sort {:?} ignored for {:?}", key, self.kind);
            return;
        }
        self.sort_key = key;
        self.recompute();
    }

    /// Replace the collection with a fresh first page.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.collection.replace(tracks);
        self.recompute();
    }

    /// Append a page. Returns the collection indices that were added.
    pub fn merge_page(&mut self, offset: usize, tracks: Vec<Track>) -> Range<usize> {
        let added = self.collection.merge_page(offset, tracks);
        if !added.is_empty() {
            self.recompute();
        }
        added
    }

    /// Update playing flags after a metadata change.
    pub fn mark_playing(&mut self, id: Option<&str>) {
        self.collection.set_active(id);
    }

    /// Rebuild the derived order from the collection.
    fn recompute(&mut self) {
        let query = self.filter_text.to_lowercase();
        let tracks = self.collection.tracks();

        let mut indices: Vec<usize> = tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| {
                query.is_empty()
                    || track.title.to_lowercase().contains(&query)
                    || track.artist.to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect();

        // sort_by is stable; equal keys stay in collection order
        if self.sort_key != SortKey::None {
            let key = self.sort_key;
            indices.sort_by(|&a, &b| compare(&tracks[a], &tracks[b], key));
        }

        self.derived = indices;
    }

    /// Play the visible set starting at a display position.
    ///
    /// Returns `None` for an out-of-range position or a placeholder row.
    pub fn activate_at(&self, derived_index: usize) -> Option<QueueRequest> {
        let track = self.get(derived_index)?;
        if !track.is_playable() {
            tracing::debug!("Ignoring activation of placeholder '{}'", track.title);
            return None;
        }
        Some(self.queue_request(Some(derived_index), false))
    }

    /// Play the visible set from the top.
    pub fn play_all(&self) -> Option<QueueRequest> {
        (!self.is_empty()).then(|| self.queue_request(Some(0), false))
    }

    /// Play the visible set from a random start.
    pub fn shuffle_all(&self) -> Option<QueueRequest> {
        (!self.is_empty()).then(|| self.queue_request(None, true))
    }

    fn queue_request(&self, start_index: Option<usize>, shuffle: bool) -> QueueRequest {
        QueueRequest {
            tracks: self.tracks().cloned().collect(),
            start_index,
            shuffle,
            source_id: self.source_id.clone(),
            is_infinite: self.capabilities().is_infinite,
        }
    }
}

fn compare(a: &Track, b: &Track, key: SortKey) -> Ordering {
    match key {
        SortKey::None => Ordering::Equal,
        SortKey::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::ArtistAsc => a.artist.to_lowercase().cmp(&b.artist.to_lowercase()),
        SortKey::AlbumAsc => a.album.to_lowercase().cmp(&b.album.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_track;
    use proptest::prelude::*;

    fn playlist(tracks: Vec<Track>) -> ViewPipeline {
        let mut view = ViewPipeline::new(CollectionKind::Playlist);
        view.reset(CollectionKind::Playlist, "PL1");
        view.replace(tracks);
        view
    }

    fn titles(view: &ViewPipeline) -> Vec<String> {
        view.tracks().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_filter_matches_title_or_artist() {
        let mut view = playlist(vec![
            mock_track("1", "Hello", "Adele"),
            mock_track("2", "Yellow", "Coldplay"),
            mock_track("3", "Lose Yourself", "Eminem"),
        ]);

        view.set_filter("  ELL ");
        assert_eq!(titles(&view), vec!["Hello", "Yellow"]);

        view.set_filter("cold");
        assert_eq!(titles(&view), vec!["Yellow"]);

        view.set_filter("");
        assert_eq!(titles(&view), vec!["Hello", "Yellow", "Lose Yourself"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut view = playlist(vec![
            mock_track("1", "b", "Same"),
            mock_track("2", "a", "Other"),
            mock_track("3", "c", "Same"),
        ]);

        view.set_sort(SortKey::ArtistAsc);
        assert_eq!(titles(&view), vec!["a", "b", "c"]);

        view.set_sort(SortKey::TitleAsc);
        assert_eq!(titles(&view), vec!["a", "b", "c"]);

        view.set_sort(SortKey::None);
        assert_eq!(titles(&view), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_ignored_for_album() {
        let mut view = ViewPipeline::new(CollectionKind::Album);
        view.reset(CollectionKind::Album, "MPRE1");
        view.replace(vec![mock_track("1", "z", "x"), mock_track("2", "a", "x")]);

        view.set_sort(SortKey::TitleAsc);
        assert_eq!(view.sort_key(), SortKey::None);
        assert_eq!(titles(&view), vec!["z", "a"]);
    }

    #[test]
    fn test_activate_uses_visible_order() {
        let mut view = playlist(vec![
            mock_track("1", "Charlie", "x"),
            mock_track("2", "Alpha", "x"),
            mock_track("3", "Bravo", "y"),
        ]);
        view.set_sort(SortKey::TitleAsc);
        view.set_filter("a");

        let request = view.activate_at(1).unwrap();
        let queued: Vec<_> = request.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(queued, vec!["Alpha", "Bravo", "Charlie"]);
        assert_eq!(request.start_index, Some(1));
        assert_eq!(request.source_id.as_deref(), Some("PL1"));
        assert!(!request.shuffle);
    }

    #[test]
    fn test_shuffle_and_empty_view() {
        let mut view = playlist(vec![mock_track("1", "One", "x")]);
        let request = view.shuffle_all().unwrap();
        assert!(request.shuffle);
        assert_eq!(request.start_index, None);

        view.set_filter("nothing matches");
        assert!(view.play_all().is_none());
        assert!(view.shuffle_all().is_none());
        assert!(view.activate_at(0).is_none());
    }

    #[test]
    fn test_placeholder_cannot_be_activated() {
        let placeholder = Track {
            title: "Unavailable".to_string(),
            ..Default::default()
        };
        let view = playlist(vec![placeholder]);
        assert!(view.activate_at(0).is_none());
    }

    #[test]
    fn test_mix_requests_are_infinite() {
        let mut view = ViewPipeline::new(CollectionKind::Mix);
        view.reset(CollectionKind::Mix, "RD1");
        view.replace(vec![mock_track("1", "One", "x")]);
        assert!(view.play_all().unwrap().is_infinite);
    }

    #[test]
    fn test_playing_indicator_survives_filter_and_sort() {
        let mut view = playlist(vec![
            mock_track("a", "Zed", "x"),
            mock_track("b", "Alpha", "x"),
            mock_track("c", "Mid", "y"),
        ]);
        view.mark_playing(Some("c"));

        view.set_sort(SortKey::TitleAsc);
        let playing: Vec<_> = (0..view.len()).filter(|&i| view.is_playing(i)).collect();
        assert_eq!(playing, vec![1]);
        assert_eq!(view.get(1).unwrap().id.as_deref(), Some("c"));

        view.set_filter("y");
        assert_eq!(view.len(), 1);
        assert!(view.is_playing(0));

        let collection = view.collection();
        for (i, track) in collection.tracks().iter().enumerate() {
            assert_eq!(collection.is_playing(i), track.has_id("c"));
        }
    }

    #[test]
    fn test_merge_page_keeps_filter() {
        let mut view = playlist(vec![mock_track("1", "Rock One", "x")]);
        view.set_filter("rock");
        view.merge_page(1, vec![mock_track("2", "Jazz", "y"), mock_track("3", "Rock Two", "z")]);

        assert_eq!(titles(&view), vec!["Rock One", "Rock Two"]);
        assert_eq!(view.collection().len(), 3);
    }

    #[test]
    fn test_reset_keeps_active_id() {
        let mut view = playlist(vec![mock_track("1", "One", "x")]);
        view.mark_playing(Some("9"));
        view.reset(CollectionKind::Album, "MPRE2");
        view.replace(vec![mock_track("9", "Nine", "x")]);
        assert!(view.is_playing(0));
    }

    fn arb_tracks() -> impl Strategy<Value = Vec<Track>> {
        prop::collection::vec(("[a-cA-C]{0,4}", "[a-cA-C]{0,4}", "[a-c]{0,2}"), 0..20).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (title, artist, album))| Track {
                        id: Some(i.to_string()),
                        title,
                        artist,
                        album,
                        ..Default::default()
                    })
                    .collect()
            },
        )
    }

    proptest! {
        /// The view holds exactly the tracks matching the filter, in collection order
        #[test]
        fn filter_is_exact_subset(tracks in arb_tracks(), text in "[a-cA-C]{0,2}") {
            let mut view = playlist(tracks.clone());
            view.set_filter(&text);

            let needle = text.to_lowercase();
            let expected: Vec<usize> = tracks
                .iter()
                .enumerate()
                .filter(|(_, t)| {
                    t.title.to_lowercase().contains(&needle)
                        || t.artist.to_lowercase().contains(&needle)
                })
                .map(|(i, _)| i)
                .collect();
            let actual: Vec<usize> = view.tracks().map(|t| t.source_index).collect();
            prop_assert_eq!(actual, expected);

            view.set_filter("");
            let restored: Vec<usize> = view.tracks().map(|t| t.source_index).collect();
            prop_assert_eq!(restored, (0..tracks.len()).collect::<Vec<_>>());
        }

        /// Equal keys keep their relative collection order
        #[test]
        fn sort_is_stable(tracks in arb_tracks()) {
            let mut view = playlist(tracks);
            for key in [SortKey::TitleAsc, SortKey::ArtistAsc, SortKey::AlbumAsc] {
                view.set_sort(key);
                let sorted: Vec<_> = view.tracks().cloned().collect();
                for pair in sorted.windows(2) {
                    let ord = compare(&pair[0], &pair[1], key);
                    prop_assert!(ord != Ordering::Greater);
                    if ord == Ordering::Equal {
                        prop_assert!(pair[0].source_index < pair[1].source_index);
                    }
                }
            }
        }

        /// Recomputing with the same inputs gives the same order
        #[test]
        fn recompute_is_idempotent(tracks in arb_tracks(), text in "[a-c]{0,1}") {
            let mut view = playlist(tracks);
            view.set_sort(SortKey::ArtistAsc);
            view.set_filter(&text);
            let first: Vec<usize> = view.tracks().map(|t| t.source_index).collect();
            view.set_filter(&text);
            view.set_sort(SortKey::ArtistAsc);
            let second: Vec<usize> = view.tracks().map(|t| t.source_index).collect();
            prop_assert_eq!(first, second);
        }
    }
}
