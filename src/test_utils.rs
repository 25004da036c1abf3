//! Test utilities and fixtures for playdeck tests.
//!
//! Mock implementations of the three outside seams (playback engine,
//! catalog, artwork loader) plus track factories.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MockBackend, mock_tracks};
//!
//! let backend = MockBackend::new();
//! let tracks = mock_tracks(5);
//! // ... drive a Session, then inspect backend.commands()
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::assets::{AssetError, AssetLoader, LoadedAsset};
use crate::catalog::{CatalogApi, CatalogError, CollectionKind, CollectionPage};
use crate::model::Track;
use crate::player::{PlaybackBackend, PlaybackStatus, PlayerCommand, PlayerError};

/// Creates a playable track with a still-style thumbnail.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let track = Track {
///     album: "Blue".to_string(),
///     ..mock_track("v1", "River", "Joni Mitchell")
/// };
/// ```
pub fn mock_track(id: &str, title: &str, artist: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        title: title.to_string(),
        artist: artist.to_string(),
        album: "Test Album".to_string(),
        duration_seconds: Some(180),
        duration_text: None,
        thumbnail: Some(format!("https://i.example/vi/{id}/sddefault.jpg")),
        ..Default::default()
    }
}

/// Creates `n` shared tracks with ids `t0`, `t1`, ...
pub fn mock_tracks(n: usize) -> Vec<Arc<Track>> {
    (0..n)
        .map(|i| {
            let mut track = mock_track(&format!("t{i}"), &format!("Track {i}"), "Test Artist");
            track.source_index = i;
            Arc::new(track)
        })
        .collect()
}

/// Creates a catalog page of `n` tracks with ids `{prefix}0`, `{prefix}1`, ...
pub fn mock_page(prefix: &str, n: usize, offset: usize) -> CollectionPage {
    CollectionPage {
        title: format!("Collection {prefix}"),
        tracks: (offset..offset + n)
            .map(|i| mock_track(&format!("{prefix}{i}"), &format!("Song {i}"), "Test Artist"))
            .collect(),
        offset,
        track_count: None,
        ..Default::default()
    }
}

/// Playback backend that records every command.
#[derive(Default)]
pub struct MockBackend {
    commands: Mutex<Vec<PlayerCommand>>,
    status: Mutex<PlaybackStatus>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far.
    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.commands.lock().clone()
    }

    /// Forget recorded commands.
    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    /// Ids of tracks that were loaded, in order.
    pub fn loaded_ids(&self) -> Vec<String> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                PlayerCommand::Load(track) => track.id.clone(),
                _ => None,
            })
            .collect()
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        *self.status.lock() = status;
    }
}

impl PlaybackBackend for MockBackend {
    fn send(&self, command: PlayerCommand) -> Result<(), PlayerError> {
        self.commands.lock().push(command);
        Ok(())
    }

    fn status(&self) -> PlaybackStatus {
        *self.status.lock()
    }

    fn volume(&self) -> f32 {
        1.0
    }
}

/// In-memory catalog.
///
/// Pages registered for an id are chained with continuation tokens `"1"`,
/// `"2"`, ...; asking past the last page returns an empty page.
#[derive(Default)]
pub struct MockCatalog {
    pages: Mutex<HashMap<String, Vec<CollectionPage>>>,
    errors: Mutex<HashMap<String, CatalogError>>,
    requests: Mutex<Vec<(CollectionKind, String, Option<String>)>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` for `id`, in order.
    pub fn with_pages(self, id: &str, mut pages: Vec<CollectionPage>) -> Self {
        let count = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            if page.continuation.is_none() && i + 1 < count {
                page.continuation = Some((i + 1).to_string());
            }
        }
        self.pages.lock().insert(id.to_string(), pages);
        self
    }

    /// Fail every request for `id` with `error`.
    pub fn with_error(self, id: &str, error: CatalogError) -> Self {
        self.errors.lock().insert(id.to_string(), error);
        self
    }

    /// Requests received so far as (kind, id, page token).
    pub fn requests(&self) -> Vec<(CollectionKind, String, Option<String>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        id: &str,
        page_token: Option<&str>,
    ) -> Result<CollectionPage, CatalogError> {
        self.requests
            .lock()
            .push((kind, id.to_string(), page_token.map(str::to_string)));

        if let Some(error) = self.errors.lock().get(id) {
            return Err(error.clone());
        }

        let pages = self.pages.lock();
        let pages = pages
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let index = match page_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|e| CatalogError::Parse(e.to_string()))?,
        };
        Ok(pages.get(index).cloned().unwrap_or_default())
    }
}

/// Artwork loader that succeeds for every URL not marked as failing.
#[derive(Default)]
pub struct MockAssetLoader {
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl MockAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make fetches of `url` fail with a 404.
    pub fn fail(&self, url: &str) {
        self.failing.lock().insert(url.to_string());
    }

    /// URLs fetched so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl AssetLoader for MockAssetLoader {
    async fn fetch(&self, url: &str) -> Result<LoadedAsset, AssetError> {
        self.requests.lock().push(url.to_string());
        if self.failing.lock().contains(url) {
            return Err(AssetError::NotFound(url.to_string()));
        }
        Ok(LoadedAsset {
            url: url.to_string(),
            data: url.as_bytes().to_vec(),
            mime_type: "image/jpeg".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_track_defaults() {
        let track = mock_track("v1", "Song", "Artist");
        assert!(track.is_playable());
        assert_eq!(track.album, "Test Album");
        assert!(track.thumbnail.unwrap().contains("v1"));
    }

    #[test]
    fn test_mock_tracks_ids() {
        let tracks = mock_tracks(3);
        let ids: Vec<_> = tracks.iter().map(|t| t.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["t0", "t1", "t2"]);
        assert_eq!(tracks[2].source_index, 2);
    }

    #[tokio::test]
    async fn test_mock_catalog_chains_pages() {
        let catalog = MockCatalog::new().with_pages(
            "PL1",
            vec![mock_page("a", 2, 0), mock_page("a", 2, 2)],
        );

        let first = catalog
            .fetch_collection(CollectionKind::Playlist, "PL1", None)
            .await
            .unwrap();
        assert_eq!(first.continuation.as_deref(), Some("1"));

        let second = catalog
            .fetch_collection(CollectionKind::Playlist, "PL1", Some("1"))
            .await
            .unwrap();
        assert!(second.continuation.is_none());
        assert_eq!(second.offset, 2);

        assert!(matches!(
            catalog.fetch_collection(CollectionKind::Playlist, "nope", None).await,
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(catalog.requests().len(), 3);
    }
}
