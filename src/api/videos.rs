//! Video routes: curated YouTube playlists

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;

use super::errors::{ApiError, ApiResult};
use super::op_result;
use super::playlists::{self, CreatePlaylistRequest, UpdatePlaylistRequest};
use super::session::RequireUser;
use crate::db::{PlaylistFilter, PlaylistTable};
use crate::models::PlaylistSource;
use crate::state::AppState;

const SOURCE: PlaylistSource = PlaylistSource::Youtube;

#[get("/playlists")]
pub async fn list_playlists(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let playlists = playlists::list(&state.pool, SOURCE).await?;
    Ok(HttpResponse::Ok().json(json!({ "playlists": playlists })))
}

/// Video ids of a curated playlist, fetched live from YouTube
#[get("/playlists/{name}")]
pub async fn get_playlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let stored = playlists::find_by_name(&state.pool, SOURCE, &path).await?;
    let video_ids = state
        .youtube
        .playlist_video_ids(&stored.external_id)
        .await
        .map_err(|e| ApiError::upstream("youtube", e))?;

    let videos: Vec<_> = video_ids.into_iter().map(|id| json!({ "id": id })).collect();

    Ok(HttpResponse::Ok().json(json!({
        "playlist": {
            "id": stored.external_id,
            "name": stored.name,
            "videos": videos,
        }
    })))
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

/// Remove playlists by their YouTube id
#[delete("/playlists/{youtube_id}")]
pub async fn delete_playlist(
    _user: RequireUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let youtube_id = path.into_inner();
    if youtube_id.trim().is_empty() {
        return Err(ApiError::NotFound);
    }

    let deleted = PlaylistTable::new(SOURCE)
        .delete(&state.pool, &PlaylistFilter::by_external_id(&youtube_id))
        .await?;
    if deleted < 1 {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(deleted, "Video deleted"),
        "videos": [{ "youtubeId": youtube_id }],
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_playlists)
        .service(get_playlist)
        .service(create_playlist)
        .service(update_playlist)
        .service(delete_playlist);
}
