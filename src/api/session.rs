//! Cookie sessions: resolving the signed-in user and issuing cookies

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use tracing::{debug, error};

use super::errors::ApiError;
use crate::config::{Settings, SESSION_COOKIE, SESSION_MAX_AGE};
use crate::models::UserPayload;
use crate::state::AppState;
use crate::utils::auth::{create_jwt, verify_jwt};

/// The signed-in user, if the session cookie holds a valid token
///
/// A missing, expired or forged token is simply anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserPayload>);

/// The signed-in user; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct RequireUser(pub UserPayload);

fn resolve(req: &HttpRequest) -> Result<Option<UserPayload>, ApiError> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        error!("Application state missing from request");
        ApiError::internal()
    })?;

    let secret = &state.settings.jwt_key;
    if secret.is_empty() {
        error!("No jwt key configured");
        return Err(ApiError::internal());
    }

    match verify_jwt(cookie.value(), secret) {
        Ok(claims) => Ok(Some(claims.user)),
        Err(e) => {
            debug!("Ignoring invalid session token: {}", e);
            Ok(None)
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req).map(CurrentUser))
    }
}

impl FromRequest for RequireUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match resolve(req) {
            Ok(Some(user)) => Ok(RequireUser(user)),
            Ok(None) => Err(ApiError::Unauthorized),
            Err(e) => Err(e),
        })
    }
}

/// Session cookie carrying a freshly signed token for `user`
pub fn session_cookie(user: UserPayload, settings: &Settings) -> Result<Cookie<'static>, ApiError> {
    if settings.jwt_key.is_empty() {
        error!("No jwt key configured");
        return Err(ApiError::internal());
    }

    let token = create_jwt(user, &settings.jwt_key, SESSION_MAX_AGE as u64).map_err(|e| {
        error!("Failed to sign session token: {}", e);
        ApiError::internal()
    })?;

    Ok(Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(settings.environment.is_production())
        .max_age(CookieDuration::seconds(SESSION_MAX_AGE))
        .finish())
}

/// Cookie that makes the browser drop the session
pub fn expired_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(0))
        .finish()
}
