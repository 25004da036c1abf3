//! Remote catalog integration.
//!
//! The catalog serves collections (albums, playlists, mixes) page by page.
//! Everything the browsing core needs from it goes through [`CatalogApi`],
//! so tests can substitute an in-memory implementation.

mod client;
pub mod dto;

pub use client::{CatalogClient, FixtureCatalog};

use async_trait::async_trait;

use crate::model::Track;

/// Kind of collection being browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionKind {
    Album,
    #[default]
    Playlist,
    /// Auto-generated, endless
    Mix,
}

/// How pages of a collection are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Everything arrives in the first response
    Single,
    /// Pages follow a continuation token until it runs out
    Paged,
    /// The source never runs out
    Endless,
}

/// What a collection kind allows the view to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_sort: bool,
    pub is_infinite: bool,
    pub fetch: FetchStrategy,
}

impl CollectionKind {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Album => Capabilities {
                supports_sort: false,
                is_infinite: false,
                fetch: FetchStrategy::Single,
            },
            Self::Playlist => Capabilities {
                supports_sort: true,
                is_infinite: false,
                fetch: FetchStrategy::Paged,
            },
            Self::Mix => Capabilities {
                supports_sort: false,
                is_infinite: true,
                fetch: FetchStrategy::Endless,
            },
        }
    }

    /// Path segment used by the catalog HTTP API.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Mix => "mix",
        }
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "album" => Ok(Self::Album),
            "playlist" => Ok(Self::Playlist),
            "mix" => Ok(Self::Mix),
            other => Err(format!("unknown collection kind: {}", other)),
        }
    }
}

/// Artist credit on a collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtistCredit {
    pub name: String,
    pub id: Option<String>,
}

/// One response from the catalog.
#[derive(Debug, Clone, Default)]
pub struct CollectionPage {
    pub title: String,
    pub description: String,
    pub tracks: Vec<Track>,
    /// Index of `tracks[0]` in the full listing
    pub offset: usize,
    /// Cover URLs, smallest first
    pub thumbnails: Vec<String>,
    pub track_count: Option<usize>,
    pub year: Option<String>,
    pub artists: Vec<ArtistCredit>,
    /// Token for the next page, if the catalog has one
    pub continuation: Option<String>,
}

impl CollectionPage {
    /// The largest cover, which the catalog lists last.
    pub fn cover_url(&self) -> Option<&str> {
        self.thumbnails.last().map(String::as_str)
    }

    /// Whether this page ends the collection for the given strategy.
    pub fn is_last(&self, fetch: FetchStrategy) -> bool {
        match fetch {
            FetchStrategy::Single => true,
            FetchStrategy::Paged => self.continuation.is_none(),
            FetchStrategy::Endless => false,
        }
    }

    /// Build the header lines shown above the track list.
    pub fn header(&self, kind: CollectionKind) -> CollectionHeader {
        let (meta, stats) = match kind {
            CollectionKind::Mix => (
                "Auto-generated Mix".to_string(),
                "Infinite Playlist".to_string(),
            ),
            CollectionKind::Album | CollectionKind::Playlist => {
                let count = self.track_count.unwrap_or(self.tracks.len());
                let mut parts = Vec::new();
                if kind == CollectionKind::Album {
                    parts.push(release_type(count).to_string());
                }
                if let Some(year) = self.year.as_deref().filter(|y| !y.is_empty()) {
                    parts.push(year.to_string());
                }
                let author = self
                    .artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                if !author.is_empty() {
                    parts.push(author);
                }
                let noun = if count == 1 { "song" } else { "songs" };
                (parts.join(" • "), format!("{} {}", count, noun))
            }
        };

        CollectionHeader {
            title: self.title.clone(),
            description: self.description.clone(),
            meta,
            stats,
            cover_url: self.cover_url().map(str::to_string),
        }
    }
}

/// Release type inferred from the number of tracks.
pub fn release_type(track_count: usize) -> &'static str {
    match track_count {
        1 => "Single",
        2..=6 => "EP",
        _ => "Album",
    }
}

/// Header text for a loaded collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionHeader {
    pub title: String,
    pub description: String,
    pub meta: String,
    pub stats: String,
    pub cover_url: Option<String>,
}

/// Errors from the catalog service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Collection not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Trait for the catalog service.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of a collection. `page_token` is `None` for the first page.
    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        id: &str,
        page_token: Option<&str>,
    ) -> Result<CollectionPage, CatalogError>;
}
