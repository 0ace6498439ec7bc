//! Music routes: the Spotify album proxy, app token and curated playlists

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;

use super::errors::{ApiError, ApiResult};
use super::op_result;
use super::playlists::{self, CreatePlaylistRequest, UpdatePlaylistRequest};
use super::session::RequireUser;
use crate::db::{PlaylistFilter, PlaylistTable};
use crate::models::PlaylistSource;
use crate::services::spotify::is_valid_id;
use crate::state::AppState;

const SOURCE: PlaylistSource = PlaylistSource::Spotify;
const SERVICE: &str = "spotify";

fn album_id(path: web::Path<String>) -> ApiResult<String> {
    let id = path.into_inner();
    if is_valid_id(&id) {
        Ok(id)
    } else {
        Err(ApiError::NotFound)
    }
}

/// Albums of the configured artist
#[get("/album")]
pub async fn get_albums(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let albums = state
        .spotify
        .artist_albums(&state.settings.artist_id)
        .await
        .map_err(|e| ApiError::upstream(SERVICE, e))?;

    Ok(HttpResponse::Ok().json(json!({ "albums": albums })))
}

#[get("/album/{id}")]
pub async fn get_album(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = album_id(path)?;
    let album = state
        .spotify
        .album(&id)
        .await
        .map_err(|e| ApiError::upstream(SERVICE, e))?;

    Ok(HttpResponse::Ok().json(json!({ "album": album })))
}

#[get("/album/{id}/tracks")]
pub async fn get_album_tracks(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = album_id(path)?;
    let tracks = state
        .spotify
        .album_tracks(&id)
        .await
        .map_err(|e| ApiError::upstream(SERVICE, e))?;

    Ok(HttpResponse::Ok().json(json!({ "tracks": tracks })))
}

/// App-level token for the browser's Spotify embed
#[get("/spotify-token")]
pub async fn get_spotify_token(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let token = state
        .spotify
        .token()
        .await
        .map_err(|e| ApiError::upstream(SERVICE, e))?;

    Ok(HttpResponse::Ok().json(token))
}

#[get("/playlists")]
pub async fn list_playlists(
    _user: RequireUser,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let playlists = playlists::list(&state.pool, SOURCE).await?;
    Ok(HttpResponse::Ok().json(json!({ "playlists": playlists })))
}

/// Tracks of a curated playlist, fetched live from Spotify
#[get("/playlists/{name}")]
pub async fn get_playlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let stored = playlists::find_by_name(&state.pool, SOURCE, &path).await?;
    let playlist = state
        .spotify
        .playlist(&stored.external_id)
        .await
        .map_err(|e| ApiError::upstream(SERVICE, e))?;

    Ok(HttpResponse::Ok().json(json!({ "playlist": playlist })))
}

#[post("/playlists")]
pub async fn create_playlist(
    _user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<CreatePlaylistRequest>,
) -> ApiResult<HttpResponse> {
    playlists::create(&state.pool, SOURCE, &body).await
}

#[put("/playlists")]
pub async fn update_playlist(
    _user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<UpdatePlaylistRequest>,
) -> ApiResult<HttpResponse> {
    playlists::update(&state.pool, SOURCE, &body).await
}

#[delete("/playlists/{name}")]
pub async fn delete_playlist(
    _user: RequireUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    if name.trim().is_empty() {
        return Err(ApiError::NotFound);
    }

    let deleted = PlaylistTable::new(SOURCE)
        .delete(&state.pool, &PlaylistFilter::by_name(&name))
        .await?;
    if deleted < 1 {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(deleted, "Playlist deleted"),
        "playlists": [{ "name": name }],
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_albums)
        .service(get_album)
        .service(get_album_tracks)
        .service(get_spotify_token)
        .service(list_playlists)
        .service(get_playlist)
        .service(create_playlist)
        .service(update_playlist)
        .service(delete_playlist);
}
