//! About page text routes

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::errors::{ApiError, ApiResult};
use super::op_result;
use super::session::RequireUser;
use super::validate::Validator;
use crate::config::ABOUT_NAME;
use crate::db::{DbError, NewText, TextFilter, TextTable};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AboutRequest {
    pub text: Option<String>,
}

fn validate(body: &AboutRequest) -> ApiResult<String> {
    let mut v = Validator::new();
    let text = v.present("text", body.text.as_deref(), "Missing text param");
    v.finish()?;
    Ok(text.unwrap_or_default())
}

#[get("")]
pub async fn get_about(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let block = TextTable::select(&state.pool, &TextFilter::by_name(ABOUT_NAME))
        .await?
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(json!({ "text": block.text })))
}

#[post("")]
pub async fn create_about(
    _user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<AboutRequest>,
) -> ApiResult<HttpResponse> {
    let text = validate(&body)?;

    let new = NewText {
        name: ABOUT_NAME.to_string(),
        text,
    };
    let block = match TextTable::insert(&state.pool, &new).await {
        Ok(block) => block,
        Err(DbError::Duplicate { .. }) => {
            return Err(ApiError::bad_request("About text already exists."))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(1, "'About' created"),
        "text": block.text,
        "name": block.name,
    })))
}

#[put("")]
pub async fn update_about(
    _user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<AboutRequest>,
) -> ApiResult<HttpResponse> {
    let text = validate(&body)?;

    TextTable::update(&state.pool, &TextFilter::by_name(ABOUT_NAME), &text).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(1, "About updated"),
        "name": ABOUT_NAME,
        "text": text,
    })))
}

#[delete("")]
pub async fn delete_about(
    _user: RequireUser,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let deleted = TextTable::delete(&state.pool, &TextFilter::by_name(ABOUT_NAME)).await?;
    if deleted < 1 {
        return Err(ApiError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "result": op_result(deleted, "'about' deleted"),
        "name": ABOUT_NAME,
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_about)
        .service(create_about)
        .service(update_about)
        .service(delete_about);
}
