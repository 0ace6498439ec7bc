//! Show listing routes, mounted under the about scope

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::errors::{ApiError, ApiResult};
use super::op_result;
use super::session::RequireUser;
use super::validate::{trimmed, LenientId, Validator};
use crate::db::{NewShow, ShowChanges, ShowFilter, ShowTable};
use crate::models::partition_shows;
use crate::state::AppState;

const DATE_MESSAGE: &str = "date must be an ISO 8601 date";

#[derive(Debug, Deserialize)]
pub struct ShowRequest {
    pub id: Option<LenientId>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Every show, split into upcoming and past relative to today (UTC)
#[get("/shows")]
pub async fn list_shows(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let shows = ShowTable::select(&state.pool, &ShowFilter::default()).await?;
    let (upcoming, past) = partition_shows(shows, Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(json!({
        "upcomingShows": upcoming,
        "pastShows": past,
    })))
}

#[post("/shows")]
pub async fn create_show(
    _user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<ShowRequest>,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    let name = v.required("name", body.name.as_deref(), "name is required");
    let date = v.iso_date("date", body.date.as_deref(), DATE_MESSAGE);
    v.finish()?;

    let new = NewShow {
        name: name.unwrap_or_default(),
        date,
        time: trimmed(body.time.as_deref()),
        location: trimmed(body.location.as_deref()),
        description: trimmed(body.description.as_deref()),
    };
    let show = ShowTable::insert(&state.pool, &new).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(1, "Show created"),
        "shows": [show],
    })))
}

/// Update a show by id; fields left out of the body keep their value
#[put("/shows")]
pub async fn update_show(
    _user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<ShowRequest>,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    let id = v.integer("id", body.id.as_ref(), "id is required");
    let name = v.required("name", body.name.as_deref(), "name is required");
    let date = v.iso_date("date", body.date.as_deref(), DATE_MESSAGE);
    v.finish()?;

    let changes = ShowChanges {
        name,
        date,
        time: trimmed(body.time.as_deref()),
        location: trimmed(body.location.as_deref()),
        description: trimmed(body.description.as_deref()),
    };
    let filter = ShowFilter::by_id(id.unwrap_or_default());
    let shows = ShowTable::update(&state.pool, &filter, &changes).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(1, "Show updated"),
        "shows": shows,
    })))
}

#[delete("/shows/{id}")]
pub async fn delete_show(
    _user: RequireUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();

    let mut v = Validator::new();
    let id = v.integer("id", Some(&LenientId::Text(raw)), "Invalid/Missing id");
    v.finish()?;
    let id = id.unwrap_or_default();

    let deleted = ShowTable::delete(&state.pool, &ShowFilter::by_id(id)).await?;
    if deleted < 1 {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(deleted, "Show deleted"),
        "shows": [{ "id": id }],
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_shows)
        .service(create_show)
        .service(update_show)
        .service(delete_show);
}
