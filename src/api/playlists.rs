//! Curated playlist handling shared by the music and video routes
//!
//! Both sources accept the same create/update bodies and resolve the
//! playlist id from either an explicit id or a shared url.

use actix_web::HttpResponse;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use super::errors::{ApiError, ApiResult};
use super::op_result;
use super::validate::{trimmed, Validator};
use crate::db::{NewPlaylist, PlaylistFilter, PlaylistTable};
use crate::models::{Playlist, PlaylistRef, PlaylistSource};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: Option<String>,
    pub id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    pub old_name: Option<String>,
    pub new_id: Option<String>,
    pub new_url: Option<String>,
}

/// Pick the playlist id from an explicit id and/or a shared url
///
/// When both are given they must name the same playlist.
pub fn resolve_playlist_id(
    source: PlaylistSource,
    id: Option<&str>,
    url: Option<&str>,
) -> ApiResult<String> {
    match (trimmed(id), trimmed(url)) {
        (None, None) => Err(ApiError::bad_request("Either id or url must be specified")),
        (id, Some(url)) => {
            let from_url = source
                .id_from_url(&url)
                .ok_or_else(|| ApiError::bad_request("Invalid url"))?;

            match id {
                Some(id) if id != from_url => Err(ApiError::bad_request(
                    "id and url disagree. Only one is necessary",
                )),
                _ => Ok(from_url),
            }
        }
        (Some(id), None) => Ok(id),
    }
}

pub async fn list(pool: &SqlitePool, source: PlaylistSource) -> ApiResult<Vec<PlaylistRef>> {
    let playlists = PlaylistTable::new(source)
        .select(pool, &PlaylistFilter::default())
        .await?;

    Ok(playlists.iter().map(Playlist::to_ref).collect())
}

/// The playlist stored under `name`, or 404
pub async fn find_by_name(
    pool: &SqlitePool,
    source: PlaylistSource,
    name: &str,
) -> ApiResult<Playlist> {
    if name.trim().is_empty() {
        return Err(ApiError::NotFound);
    }

    PlaylistTable::new(source)
        .select(pool, &PlaylistFilter::by_name(name))
        .await?
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound)
}

pub async fn create(
    pool: &SqlitePool,
    source: PlaylistSource,
    body: &CreatePlaylistRequest,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    v.one_of(&[body.id.as_deref(), body.url.as_deref()], "No id or url specified");
    let name = v.required("name", body.name.as_deref(), "Name required");
    v.finish()?;

    let external_id = resolve_playlist_id(source, body.id.as_deref(), body.url.as_deref())?;
    let new = NewPlaylist {
        external_id,
        name: name.unwrap_or_default(),
    };
    let playlist = PlaylistTable::new(source).insert(pool, &new).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(1, &format!("Number of {} playlists created", source.as_str())),
        "playlists": [playlist.to_ref()],
    })))
}

/// Point the playlist named `oldName` at a new id
pub async fn update(
    pool: &SqlitePool,
    source: PlaylistSource,
    body: &UpdatePlaylistRequest,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    v.one_of(
        &[body.new_id.as_deref(), body.new_url.as_deref()],
        "No newId or newUrl specified",
    );
    let old_name = v.required("oldName", body.old_name.as_deref(), "Name required");
    v.finish()?;

    let external_id = resolve_playlist_id(source, body.new_id.as_deref(), body.new_url.as_deref())?;
    let filter = PlaylistFilter::by_name(&old_name.unwrap_or_default());
    let playlists = PlaylistTable::new(source)
        .update(pool, &filter, &external_id)
        .await?;
    let refs: Vec<PlaylistRef> = playlists.iter().map(Playlist::to_ref).collect();

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(
            refs.len() as u64,
            &format!("Number of {} playlists updated", source.as_str()),
        ),
        "playlists": refs,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::BadRequest(msg) => msg,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_resolve_playlist_id() {
        let spotify = PlaylistSource::Spotify;
        let url = "https://open.spotify.com/playlist/4aawyAB9vmqN3uQ7FjRGTy?si=1";

        assert_eq!(resolve_playlist_id(spotify, Some("abc"), None).unwrap(), "abc");
        assert_eq!(
            resolve_playlist_id(spotify, None, Some(url)).unwrap(),
            "4aawyAB9vmqN3uQ7FjRGTy"
        );
        assert_eq!(
            resolve_playlist_id(spotify, Some("4aawyAB9vmqN3uQ7FjRGTy"), Some(url)).unwrap(),
            "4aawyAB9vmqN3uQ7FjRGTy"
        );

        assert_eq!(
            message(resolve_playlist_id(spotify, Some("other"), Some(url)).unwrap_err()),
            "id and url disagree. Only one is necessary"
        );
        assert_eq!(
            message(resolve_playlist_id(spotify, None, None).unwrap_err()),
            "Either id or url must be specified"
        );
        assert_eq!(
            message(resolve_playlist_id(spotify, Some(" "), Some("")).unwrap_err()),
            "Either id or url must be specified"
        );
        assert_eq!(
            message(resolve_playlist_id(spotify, None, Some("https://example.com")).unwrap_err()),
            "Invalid url"
        );
    }

    #[test]
    fn test_resolve_youtube_url() {
        let youtube = PlaylistSource::Youtube;
        assert_eq!(
            resolve_playlist_id(youtube, None, Some("https://youtube.com/playlist?list=PLx1")).unwrap(),
            "PLx1"
        );
    }
}
