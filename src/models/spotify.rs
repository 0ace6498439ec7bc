//! Spotify data as served to the site
//!
//! These shapes are decoupled from Spotify's own schema so the frontend does
//! not break when the upstream payload changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// App-level Spotify access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyToken {
    pub access_token: String,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
    pub uri: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumCover {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub url: String,
}

/// Cover art in the three sizes Spotify serves, largest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumImages {
    pub large: Option<AlbumCover>,
    pub medium: Option<AlbumCover>,
    pub small: Option<AlbumCover>,
}

impl AlbumImages {
    pub fn from_covers(covers: Vec<AlbumCover>) -> Self {
        let mut covers = covers.into_iter();
        Self {
            large: covers.next(),
            medium: covers.next(),
            small: covers.next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub album_type: String,
    pub artist: ArtistRef,
    pub images: AlbumImages,
    pub num_tracks: u32,
    pub name: String,
    pub release_date: String,
    pub external_url: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub artist: ArtistRef,
    /// Duration in milliseconds
    pub duration: u64,
    pub external_url: String,
    pub id: String,
    pub name: String,
    pub preview_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
}

/// A curated Spotify playlist with its tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub external_url: String,
    pub images: Vec<AlbumCover>,
    pub tracks: Vec<Track>,
}
