//! Clients for the services the site depends on: Spotify, YouTube and mail

pub mod mailer;
pub mod spotify;
pub mod youtube;

pub use mailer::{ContactMessage, EmailTemplates, Mailer, OutgoingEmail, SmtpMailer};
pub use spotify::{SpotifyClient, SpotifyTokenCache};
pub use youtube::YoutubeClient;

use thiserror::Error;

/// Failure talking to an external service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The upstream payload could not be reshaped
    #[error("unexpected upstream payload: {0}")]
    Conversion(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("template error: {0}")]
    Template(String),

    #[error("mail error: {0}")]
    Mail(String),
}

/// Turn a non-success response into `ServiceError::Upstream`, keeping the
/// upstream error message when the body has one
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
    let message = body
        .pointer("/error/message")
        .or_else(|| body.get("error_description"))
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
        .to_string();

    Err(ServiceError::Upstream {
        status: status.as_u16(),
        message,
    })
}
