//! REST API routes for the band site

pub mod about;
pub mod contact;
pub mod errors;
pub mod images;
pub mod music;
pub mod playlists;
pub mod session;
pub mod shows;
pub mod users;
pub mod validate;
pub mod videos;

use actix_web::{web, HttpResponse};
use serde_json::json;

use errors::{ApiError, ApiResult};

/// `result` object included in mutation responses
pub fn op_result(value: u64, description: &str) -> serde_json::Value {
    json!({ "value": value, "description": description })
}

/// Largest accepted JSON body (100kb)
pub const JSON_LIMIT: usize = 100 * 1024;

async fn not_found() -> ApiResult<HttpResponse> {
    Err(ApiError::NotFound)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        // About text and show listings
        .service(
            web::scope("/api/about")
                .configure(about::configure)
                .configure(shows::configure),
        )
        // Spotify albums, token and playlists
        .service(web::scope("/api/music").configure(music::configure))
        // YouTube playlists
        .service(web::scope("/api/videos").configure(videos::configure))
        // Contact form
        .service(web::scope("/api/contact").configure(contact::configure))
        // Accounts and sessions
        .service(web::scope("/api/users").configure(users::configure))
        // Images for outgoing mail
        .service(web::scope("/images").configure(images::configure))
        .default_service(web::route().to(not_found));
}
