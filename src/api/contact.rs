//! Contact form: mails a booking request to the site admin

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::errors::{ApiError, ApiResult};
use super::validate::{trimmed, Validator};
use crate::db::{UserFilter, UserTable};
use crate::services::ContactMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub venue: Option<String>,
    pub comment: Option<String>,
}

#[post("")]
pub async fn submit_contact(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let mut v = Validator::new();
    let name = v.required("name", body.name.as_deref(), "You must supply a name");
    let email = v.email("email", body.email.as_deref(), "Email must be valid");
    let comment = v.required("comment", body.comment.as_deref(), "You must supply a comment");
    v.finish()?;

    let message = ContactMessage {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        venue: trimmed(body.venue.as_deref()),
        comment: comment.unwrap_or_default(),
    };

    let admin_filter = UserFilter {
        username: Some(state.settings.site_admin.clone()),
        admin: Some(true),
        ..Default::default()
    };
    let admin = UserTable::select(&state.pool, &admin_filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            error!(
                "No admin found with username {:?}",
                state.settings.site_admin
            );
            ApiError::internal()
        })?;

    let email = state
        .templates
        .contact_email(&admin.email, &message, state.settings.email_backend_url())
        .map_err(|e| ApiError::upstream("mail", e))?;

    state
        .mailer
        .send(email)
        .await
        .map_err(|e| ApiError::upstream("mail", e))?;

    info!("Forwarded contact form from {}", message.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Contact form was submitted successfully",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_contact);
}
