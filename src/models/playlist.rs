//! Curated external playlist model

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SPOTIFY_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://open\.spotify\.com/playlist/([A-Za-z0-9]+)(?:[?#].*)?$").unwrap()
});
static YOUTUBE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*(?:youtu\.be/|list=)([^#&?]+).*$").unwrap());

/// Service a playlist lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistSource {
    Spotify,
    Youtube,
}

impl PlaylistSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistSource::Spotify => "spotify",
            PlaylistSource::Youtube => "youtube",
        }
    }

    /// Table holding playlists of this source
    pub fn table(&self) -> &'static str {
        match self {
            PlaylistSource::Spotify => "spotify_playlists",
            PlaylistSource::Youtube => "youtube_playlists",
        }
    }

    /// Column holding the service's playlist id
    pub fn id_column(&self) -> &'static str {
        match self {
            PlaylistSource::Spotify => "spotify_id",
            PlaylistSource::Youtube => "youtube_id",
        }
    }

    /// Extract the service's playlist id from a shared url
    pub fn id_from_url(&self, url: &str) -> Option<String> {
        let re = match self {
            PlaylistSource::Spotify => &SPOTIFY_URL_RE,
            PlaylistSource::Youtube => &YOUTUBE_URL_RE,
        };

        re.captures(url.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// A playlist linked from the site, looked up by `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Database ID
    pub id: i64,
    pub source: PlaylistSource,
    /// Id on the external service
    pub external_id: String,
    /// Display name, unique per source
    pub name: String,
}

impl Playlist {
    pub fn to_ref(&self) -> PlaylistRef {
        PlaylistRef {
            id: self.external_id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Playlist as returned to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}
