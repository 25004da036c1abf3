//! Catalog API Data Transfer Objects
//!
//! Wire shapes for collection responses. These follow the catalog's JSON
//! (camelCase keys, loosely typed fields) and are converted into
//! [`CollectionPage`] before anything else sees them.

use serde::{Deserialize, Serialize};

use super::{ArtistCredit, CollectionKind, CollectionPage};
use crate::assets::resolution::upscale;
use crate::model::{LikeStatus, Track};

/// Edge length album covers are requested at.
pub const ALBUM_COVER_SIZE: u32 = 544;

/// A collection response (first page or continuation).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectionResponse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tracks: Vec<TrackDto>,
    pub thumbnails: Vec<ThumbnailDto>,
    #[serde(rename = "trackCount")]
    pub track_count: Option<usize>,
    pub year: Option<YearField>,
    pub artists: Vec<ArtistDto>,
    pub continuation: Option<String>,
    /// Index of the first track in this response within the full listing
    pub offset: Option<usize>,
}

/// A track entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackDto {
    pub title: Option<String>,
    pub artists: Option<Vec<ArtistDto>>,
    pub artist: Option<String>,
    pub album: Option<AlbumField>,
    pub duration_seconds: Option<u32>,
    pub duration: Option<String>,
    pub thumbnails: Vec<ThumbnailDto>,
    pub thumb: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "likeStatus")]
    pub like_status: Option<String>,
}

/// Thumbnail entry. Only the URL is used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThumbnailDto {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Artist reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Album appears either as an object or a bare name.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AlbumField {
    Object {
        #[serde(default)]
        name: Option<String>,
    },
    Name(String),
}

/// Year appears either as a number or a string.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum YearField {
    Number(i64),
    Text(String),
}

impl TrackDto {
    /// Convert into a [`Track`]. `source_index` is assigned on ingestion.
    pub fn into_track(self) -> Track {
        let artist = match self.artists {
            Some(list) => list
                .into_iter()
                .map(|a| a.name.unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", "),
            None => self.artist.unwrap_or_else(|| "Unknown".to_string()),
        };

        let album = match self.album {
            Some(AlbumField::Object { name }) => name.unwrap_or_default(),
            Some(AlbumField::Name(name)) => name,
            None => String::new(),
        };

        let thumbnail = self
            .thumbnails
            .last()
            .map(|t| t.url.clone())
            .or(self.thumb);

        Track {
            id: self.video_id,
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            artist,
            album,
            duration_seconds: self.duration_seconds,
            duration_text: self.duration,
            thumbnail,
            like_status: self
                .like_status
                .as_deref()
                .map(LikeStatus::from_wire)
                .unwrap_or_default(),
            source_index: 0,
        }
    }
}

impl CollectionResponse {
    /// Convert into a [`CollectionPage`].
    ///
    /// Album covers are requested at [`ALBUM_COVER_SIZE`] and handed down to
    /// tracks that come without artwork of their own.
    pub fn into_page(self, kind: CollectionKind) -> CollectionPage {
        let mut thumbnails: Vec<String> = self.thumbnails.into_iter().map(|t| t.url).collect();
        if kind == CollectionKind::Album {
            for url in &mut thumbnails {
                *url = upscale(url, ALBUM_COVER_SIZE);
            }
        }
        let album_cover = thumbnails.last().cloned();

        let tracks = self
            .tracks
            .into_iter()
            .map(|dto| {
                let mut track = dto.into_track();
                if kind == CollectionKind::Album && track.thumbnail.is_none() {
                    track.thumbnail = album_cover.clone();
                }
                track
            })
            .collect();

        CollectionPage {
            title: self.title.unwrap_or_else(|| match kind {
                CollectionKind::Album => "Unknown Album".to_string(),
                CollectionKind::Playlist => "Unknown Playlist".to_string(),
                CollectionKind::Mix => "Unknown Mix".to_string(),
            }),
            description: self.description.unwrap_or_default(),
            tracks,
            offset: self.offset.unwrap_or(0),
            thumbnails,
            track_count: self.track_count,
            year: self.year.map(|y| match y {
                YearField::Number(n) => n.to_string(),
                YearField::Text(s) => s,
            }),
            artists: self
                .artists
                .into_iter()
                .map(|a| ArtistCredit {
                    name: a.name.unwrap_or_else(|| "Unknown".to_string()),
                    id: a.id,
                })
                .collect(),
            continuation: self.continuation,
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_track_with_artist_list() {
        let json = r#"{
            "title": "Song",
            "artists": [{"name": "A", "id": "1"}, {"name": "B"}],
            "album": {"name": "Record", "id": "r1"},
            "duration_seconds": 200,
            "thumbnails": [
                {"url": "https://img/small.jpg", "width": 60, "height": 60},
                {"url": "https://img/large.jpg", "width": 120, "height": 120}
            ],
            "videoId": "vid1",
            "likeStatus": "LIKE"
        }"#;
        let dto: TrackDto = serde_json::from_str(json).unwrap();
        let track = dto.into_track();

        assert_eq!(track.artist, "A, B");
        assert_eq!(track.album, "Record");
        assert_eq!(track.thumbnail.as_deref(), Some("https://img/large.jpg"));
        assert_eq!(track.id.as_deref(), Some("vid1"));
        assert_eq!(track.like_status, LikeStatus::Like);
        assert_eq!(track.display_duration(), "3:20");
    }

    #[test]
    fn test_parse_minimal_track() {
        let json = r#"{"artist": "Solo", "album": "Plain", "thumb": "https://img/t.jpg", "duration": "2:05"}"#;
        let track = serde_json::from_str::<TrackDto>(json).unwrap().into_track();

        assert_eq!(track.title, "Unknown");
        assert_eq!(track.artist, "Solo");
        assert_eq!(track.album, "Plain");
        assert_eq!(track.thumbnail.as_deref(), Some("https://img/t.jpg"));
        assert!(!track.is_playable());
        assert_eq!(track.like_status, LikeStatus::Indifferent);
        assert_eq!(track.display_duration(), "2:05");
    }

    #[test]
    fn test_album_cover_upscaled_and_propagated() {
        let json = r#"{
            "title": "LP",
            "year": 1999,
            "trackCount": 2,
            "thumbnails": [{"url": "https://lh3.example/cover=w120-h120-l90"}],
            "tracks": [
                {"title": "One", "videoId": "1"},
                {"title": "Two", "videoId": "2", "thumb": "https://img/own.jpg"}
            ]
        }"#;
        let response: CollectionResponse = serde_json::from_str(json).unwrap();
        let page = response.into_page(CollectionKind::Album);

        assert_eq!(page.cover_url(), Some("https://lh3.example/cover=w544-h544-l90"));
        assert_eq!(
            page.tracks[0].thumbnail.as_deref(),
            Some("https://lh3.example/cover=w544-h544-l90")
        );
        assert_eq!(page.tracks[1].thumbnail.as_deref(), Some("https://img/own.jpg"));
        assert_eq!(page.year.as_deref(), Some("1999"));
    }

    #[test]
    fn test_playlist_keeps_continuation() {
        let json = r#"{"title": "Mine", "tracks": [], "continuation": "abc", "offset": 100}"#;
        let page = serde_json::from_str::<CollectionResponse>(json)
            .unwrap()
            .into_page(CollectionKind::Playlist);
        assert_eq!(page.continuation.as_deref(), Some("abc"));
        assert_eq!(page.offset, 100);
    }
}
