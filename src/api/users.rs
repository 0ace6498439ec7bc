//! User account routes: signup, signin, session handling and profile update

use actix_web::{get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::errors::{ApiError, ApiResult};
use super::session::{expired_cookie, session_cookie, CurrentUser, RequireUser};
use super::validate::Validator;
use crate::db::{NewUser, UserChanges, UserFilter, UserTable};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Create an account and sign it in; disabled in production
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    let email = v.email("email", body.email.as_deref(), "Email must be valid");
    let username = v.required("username", body.username.as_deref(), "Username must be defined");
    let password = v.length(
        "password",
        body.password.as_deref(),
        6,
        20,
        "Password must be between 6 and 20 characters",
    );
    v.finish()?;

    if state.settings.environment.is_production() {
        return Err(ApiError::NotFound);
    }

    let email = email.unwrap_or_default();
    let username = username.unwrap_or_default();

    if !UserTable::select(&state.pool, &UserFilter::by_email(&email)).await?.is_empty() {
        return Err(ApiError::bad_request("Email already in use"));
    }
    if !UserTable::select(&state.pool, &UserFilter::by_username(&username)).await?.is_empty() {
        return Err(ApiError::bad_request("Username already in use"));
    }

    let new = NewUser {
        username,
        email,
        password: password.unwrap_or_default(),
        admin: true,
    };
    let user = UserTable::insert(&state.pool, &new).await?;
    info!("Created user {}", user.username);

    let cookie = session_cookie(user.to_payload(), &state.settings)?;
    Ok(HttpResponse::Created().cookie(cookie).json(user.to_public()))
}

#[post("/signin")]
pub async fn signin(
    state: web::Data<AppState>,
    body: web::Json<SigninRequest>,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    let username = v.required("username", body.username.as_deref(), "You must supply a username");
    let password = v.required("password", body.password.as_deref(), "You must supply a password");
    v.finish()?;

    let username = username.unwrap_or_default();
    let password = password.unwrap_or_default();

    let users = UserTable::select(&state.pool, &UserFilter::by_username(&username)).await?;
    let user = match users.as_slice() {
        [] => return Err(ApiError::bad_request(INVALID_CREDENTIALS)),
        [user] => user,
        _ => {
            error!("Found {} users named {}", users.len(), username);
            return Err(ApiError::internal());
        }
    };

    if !UserTable::validate_password(&state.pool, &username, &password).await? {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    let cookie = session_cookie(user.to_payload(), &state.settings)?;
    Ok(HttpResponse::Ok().cookie(cookie).json(user.to_public()))
}

#[post("/signout")]
pub async fn signout() -> HttpResponse {
    HttpResponse::Ok().cookie(expired_cookie()).json(json!({}))
}

/// The identity in the session cookie, or null
#[get("/current-user")]
pub async fn current_user(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "currentUser": user.0 }))
}

/// Re-issue the session cookie with a fresh expiry
#[get("/extend-session")]
pub async fn extend_session(
    user: RequireUser,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let cookie = session_cookie(user.0, &state.settings)?;
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": "success" })))
}

#[put("/update")]
pub async fn update_user(
    user: RequireUser,
    state: web::Data<AppState>,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    let username = v.required("username", body.username.as_deref(), "You must supply a username");
    let email = v.required("email", body.email.as_deref(), "You must supply an email");
    v.finish()?;

    let changes = UserChanges {
        username,
        email,
        ..Default::default()
    };
    let updated = UserTable::update(&state.pool, &UserFilter::by_id(user.0.id), &changes)
        .await?
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound)?;

    let cookie = session_cookie(updated.to_payload(), &state.settings)?;
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "updatedUser": updated.to_public() })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(signin)
        .service(signout)
        .service(current_user)
        .service(extend_session)
        .service(update_user);
}
