//! Spotify Web API client
//!
//! Uses the client-credentials grant for an app-level token, cached until
//! shortly before it expires. Responses are reshaped into the site's own
//! album/track/playlist shapes.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{check_status, ServiceError};
use crate::config::SpotifySettings;
use crate::models::{
    Album, AlbumCover, AlbumImages, ArtistRef, PlaylistDetails, SpotifyToken, Track,
};

/// Tokens this close to expiry are refreshed
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Stop following a playlist's `tracks.next` after this many extra pages
const MAX_TRACK_PAGES: usize = 40;

/// Spotify ids are base62
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Local files in playlists carry artists with null `id` and `uri`
#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    height: Option<u32>,
    width: Option<u32>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    album_type: String,
    artists: Vec<SpotifyArtist>,
    #[serde(default)]
    images: Option<Vec<SpotifyImage>>,
    total_tracks: u32,
    name: String,
    release_date: String,
    #[serde(default)]
    external_urls: ExternalUrls,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    artists: Vec<SpotifyArtist>,
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    id: Option<String>,
    name: String,
    preview_url: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyPlaylist {
    id: String,
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    images: Option<Vec<SpotifyImage>>,
    tracks: Paging<PlaylistItem>,
}

fn convert_artist(artists: Vec<SpotifyArtist>, what: &str) -> Result<ArtistRef, ServiceError> {
    artists
        .into_iter()
        .next()
        .map(|a| ArtistRef {
            name: a.name,
            uri: a.uri.unwrap_or_default(),
            id: a.id.unwrap_or_default(),
        })
        .ok_or_else(|| ServiceError::Conversion(format!("{what} has no artists")))
}

fn convert_covers(images: Option<Vec<SpotifyImage>>) -> Vec<AlbumCover> {
    images
        .unwrap_or_default()
        .into_iter()
        .map(|i| AlbumCover {
            height: i.height,
            width: i.width,
            url: i.url,
        })
        .collect()
}

fn convert_album(album: SpotifyAlbum) -> Result<Album, ServiceError> {
    let artist = convert_artist(album.artists, &format!("album {}", album.id))?;

    Ok(Album {
        id: album.id,
        kind: album.kind,
        album_type: album.album_type,
        artist,
        images: AlbumImages::from_covers(convert_covers(album.images)),
        num_tracks: album.total_tracks,
        name: album.name,
        release_date: album.release_date,
        external_url: album.external_urls.spotify,
        uri: album.uri,
    })
}

fn convert_track(track: SpotifyTrack) -> Result<Track, ServiceError> {
    let artist = convert_artist(track.artists, &format!("track {}", track.uri))?;

    Ok(Track {
        artist,
        duration: track.duration_ms,
        external_url: track.external_urls.spotify,
        id: track.id.unwrap_or_default(),
        name: track.name,
        preview_url: track.preview_url,
        kind: track.kind,
        uri: track.uri,
    })
}

fn convert_playlist(playlist: SpotifyPlaylist) -> Result<PlaylistDetails, ServiceError> {
    let tracks = playlist
        .tracks
        .items
        .into_iter()
        .filter_map(|item| item.track)
        .map(convert_track)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlaylistDetails {
        id: playlist.id,
        name: playlist.name,
        external_url: playlist.external_urls.spotify,
        images: convert_covers(playlist.images),
        tracks,
    })
}

/// Process-wide cache of the app token
#[derive(Debug, Default)]
pub struct SpotifyTokenCache {
    token: RwLock<Option<SpotifyToken>>,
}

impl SpotifyTokenCache {
    /// The cached token if it is still usable at `now`
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<SpotifyToken> {
        self.token
            .read()
            .as_ref()
            .filter(|t| t.expires - ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now)
            .cloned()
    }

    pub fn store(&self, token: SpotifyToken) {
        *self.token.write() = Some(token);
    }
}

/// Spotify API client owning its token cache
pub struct SpotifyClient {
    client: Client,
    settings: SpotifySettings,
    cache: SpotifyTokenCache,
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            settings,
            cache: SpotifyTokenCache::default(),
        })
    }

    #[cfg(test)]
    pub fn cache(&self) -> &SpotifyTokenCache {
        &self.cache
    }

    /// A valid app token, fetching a new one when the cached one is stale
    ///
    /// Concurrent callers may both refresh; the last write wins.
    pub async fn token(&self) -> Result<SpotifyToken, ServiceError> {
        if let Some(token) = self.cache.fresh(Utc::now()) {
            return Ok(token);
        }

        let token = self.request_token().await?;
        self.cache.store(token.clone());

        Ok(token)
    }

    async fn request_token(&self) -> Result<SpotifyToken, ServiceError> {
        if self.settings.client_id.is_empty() || self.settings.client_secret.is_empty() {
            return Err(ServiceError::NotConfigured("spotify client credentials"));
        }

        let url = format!("{}/api/token", self.settings.accounts_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let body: TokenResponse = check_status(response).await?.json().await?;
        info!("Fetched spotify token valid for {}s", body.expires_in);

        Ok(SpotifyToken {
            access_token: body.access_token,
            expires: Utc::now() + ChronoDuration::seconds(body.expires_in),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        self.fetch(&format!("{}{}", self.settings.api_url, path)).await
    }

    /// GET an absolute url, such as a paging `next` link
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        let token = self.token().await?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Albums released by an artist
    pub async fn artist_albums(&self, artist_id: &str) -> Result<Vec<Album>, ServiceError> {
        let page: Paging<SpotifyAlbum> = self.get(&format!("/artists/{artist_id}/albums")).await?;
        page.items.into_iter().map(convert_album).collect()
    }

    pub async fn album(&self, album_id: &str) -> Result<Album, ServiceError> {
        let album: SpotifyAlbum = self.get(&format!("/albums/{album_id}")).await?;
        convert_album(album)
    }

    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>, ServiceError> {
        let page: Paging<SpotifyTrack> = self.get(&format!("/albums/{album_id}/tracks")).await?;
        page.items.into_iter().map(convert_track).collect()
    }

    /// A playlist with its tracks; removed or unavailable tracks are skipped
    pub async fn playlist(&self, playlist_id: &str) -> Result<PlaylistDetails, ServiceError> {
        let mut playlist: SpotifyPlaylist = self.get(&format!("/playlists/{playlist_id}")).await?;

        let mut next = playlist.tracks.next.take();
        let mut pages = 0;
        while let Some(url) = next {
            if pages == MAX_TRACK_PAGES {
                warn!(
                    "Playlist {} still had tracks after {} pages, truncating",
                    playlist_id, MAX_TRACK_PAGES
                );
                break;
            }

            let page: Paging<PlaylistItem> = self.fetch(&url).await?;
            playlist.tracks.items.extend(page.items);
            next = page.next;
            pages += 1;
        }

        convert_playlist(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn album_json() -> serde_json::Value {
        json!({
            "id": "alb1",
            "type": "album",
            "album_type": "single",
            "artists": [{"name": "The Trio", "id": "art1", "uri": "spotify:artist:art1"}],
            "images": [
                {"height": 640, "width": 640, "url": "https://i.scdn.co/large"},
                {"height": 300, "width": 300, "url": "https://i.scdn.co/medium"},
                {"height": 64, "width": 64, "url": "https://i.scdn.co/small"}
            ],
            "total_tracks": 4,
            "name": "Late Sets",
            "release_date": "2021-06-01",
            "external_urls": {"spotify": "https://open.spotify.com/album/alb1"},
            "uri": "spotify:album:alb1"
        })
    }

    fn track_json(artists: serde_json::Value) -> serde_json::Value {
        json!({
            "artists": artists,
            "duration_ms": 201000,
            "external_urls": {"spotify": "https://open.spotify.com/track/t1"},
            "id": "t1",
            "name": "Blue in Green",
            "preview_url": null,
            "type": "track",
            "uri": "spotify:track:t1"
        })
    }

    #[test]
    fn test_convert_album() {
        let raw: SpotifyAlbum = serde_json::from_value(album_json()).unwrap();
        let album = convert_album(raw).unwrap();

        assert_eq!(album.artist.name, "The Trio");
        assert_eq!(album.num_tracks, 4);
        assert_eq!(album.external_url, "https://open.spotify.com/album/alb1");
        assert_eq!(album.images.large.as_ref().unwrap().url, "https://i.scdn.co/large");
        assert_eq!(album.images.small.as_ref().unwrap().height, Some(64));

        let out = serde_json::to_value(&album).unwrap();
        assert_eq!(out["albumType"], "single");
        assert_eq!(out["type"], "album");
        assert_eq!(out["releaseDate"], "2021-06-01");
    }

    #[test]
    fn test_convert_track_requires_artist() {
        let ok: SpotifyTrack = serde_json::from_value(track_json(json!([
            {"name": "The Trio", "id": "art1", "uri": "spotify:artist:art1"}
        ])))
        .unwrap();
        let track = convert_track(ok).unwrap();
        assert_eq!(track.duration, 201000);
        assert_eq!(track.preview_url, None);

        let bad: SpotifyTrack = serde_json::from_value(track_json(json!([]))).unwrap();
        assert!(matches!(convert_track(bad), Err(ServiceError::Conversion(_))));
    }

    #[test]
    fn test_convert_playlist_skips_missing_tracks() {
        let raw: SpotifyPlaylist = serde_json::from_value(json!({
            "id": "pl1",
            "name": "Highlights",
            "external_urls": {"spotify": "https://open.spotify.com/playlist/pl1"},
            "images": null,
            "tracks": {"items": [
                {"track": track_json(json!([{"name": "A", "id": "a", "uri": "spotify:artist:a"}]))},
                {"track": null}
            ]}
        }))
        .unwrap();

        let playlist = convert_playlist(raw).unwrap();
        assert_eq!(playlist.tracks.len(), 1);
        assert!(playlist.images.is_empty());
    }

    #[test]
    fn test_convert_playlist_with_local_file() {
        let local = json!({
            "artists": [{"name": "Rehearsal Tape", "id": null, "uri": null, "type": "artist"}],
            "duration_ms": 95000,
            "external_urls": {},
            "id": null,
            "is_local": true,
            "name": "Soundcheck",
            "preview_url": null,
            "type": "track",
            "uri": "spotify:local:Rehearsal+Tape::Soundcheck:95"
        });
        let raw: SpotifyPlaylist = serde_json::from_value(json!({
            "id": "pl1",
            "name": "Highlights",
            "tracks": {"items": [
                {"track": track_json(json!([{"name": "A", "id": "a", "uri": "spotify:artist:a"}]))},
                {"track": local}
            ]}
        }))
        .unwrap();

        let playlist = convert_playlist(raw).unwrap();
        assert_eq!(playlist.tracks.len(), 2);

        let local = &playlist.tracks[1];
        assert_eq!(local.artist.name, "Rehearsal Tape");
        assert_eq!(local.artist.id, "");
        assert_eq!(local.artist.uri, "");
        assert_eq!(local.id, "");
        assert_eq!(local.external_url, "");
    }

    /// Answers each connection with the JSON body routed by request path
    fn serve_json(listener: tokio::net::TcpListener, routes: Vec<(String, String)>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("").to_string();

                let (status, body) = match routes.iter().find(|(p, _)| *p == path) {
                    Some((_, body)) => ("200 OK", body.clone()),
                    None => ("404 Not Found", "{}".to_string()),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
    }

    #[tokio::test]
    async fn test_playlist_follows_track_pages() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let artists = json!([{"name": "A", "id": "a", "uri": "spotify:artist:a"}]);

        let first = json!({
            "id": "pl1",
            "name": "Highlights",
            "tracks": {
                "items": [{"track": track_json(artists.clone())}],
                "next": format!("{base}/playlists/pl1/tracks?offset=1&limit=1")
            }
        });
        let second = json!({
            "items": [{"track": null}, {"track": track_json(artists.clone())}],
            "next": format!("{base}/playlists/pl1/tracks?offset=3&limit=1")
        });
        let third = json!({
            "items": [{"track": track_json(artists)}],
            "next": null
        });
        serve_json(
            listener,
            vec![
                ("/playlists/pl1".to_string(), first.to_string()),
                ("/playlists/pl1/tracks?offset=1&limit=1".to_string(), second.to_string()),
                ("/playlists/pl1/tracks?offset=3&limit=1".to_string(), third.to_string()),
            ],
        );

        let client = SpotifyClient::new(SpotifySettings {
            api_url: base,
            ..Default::default()
        })
        .unwrap();
        client.cache().store(SpotifyToken {
            access_token: "cached".to_string(),
            expires: Utc::now() + ChronoDuration::seconds(3600),
        });

        let playlist = client.playlist("pl1").await.unwrap();
        assert_eq!(playlist.name, "Highlights");
        assert_eq!(playlist.tracks.len(), 3);
    }

    #[test]
    fn test_token_cache_margin() {
        let cache = SpotifyTokenCache::default();
        let now = Utc::now();
        assert!(cache.fresh(now).is_none());

        cache.store(SpotifyToken {
            access_token: "abc".to_string(),
            expires: now + ChronoDuration::seconds(3600),
        });
        assert_eq!(cache.fresh(now).unwrap().access_token, "abc");

        // inside the refresh margin counts as stale
        assert!(cache.fresh(now + ChronoDuration::seconds(3590)).is_none());
    }

    #[tokio::test]
    async fn test_token_served_from_cache() {
        let client = SpotifyClient::new(SpotifySettings::default()).unwrap();
        client.cache().store(SpotifyToken {
            access_token: "cached".to_string(),
            expires: Utc::now() + ChronoDuration::seconds(3600),
        });

        let token = client.token().await.unwrap();
        assert_eq!(token.access_token, "cached");
    }

    #[tokio::test]
    async fn test_token_requires_credentials() {
        let client = SpotifyClient::new(SpotifySettings::default()).unwrap();
        let err = client.token().await.unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
    }

    #[test]
    fn test_valid_id() {
        assert!(is_valid_id("4aawyAB9vmqN3uQ7FjRGTy"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../me"));
    }
}
