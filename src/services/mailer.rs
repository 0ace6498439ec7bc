//! Contact-form mail: template rendering and SMTP delivery

use async_trait::async_trait;
use handlebars::Handlebars;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use tracing::info;

use super::ServiceError;
use crate::config::SmtpSettings;

pub const CONTACT_SUBJECT: &str = "Booking request for the trio.";

/// SMTPS port; any other port upgrades a plain connection with STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

const CONTACT_TEMPLATE: &str = include_str!("../../templates/email.html");

/// A submitted contact form
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub venue: Option<String>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers rendered mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactVars<'a> {
    name: &'a str,
    email: &'a str,
    venue: &'a str,
    comment: &'a str,
    backend_url: &'a str,
}

/// Compiled mail templates
pub struct EmailTemplates {
    registry: Handlebars<'static>,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, ServiceError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("contact", CONTACT_TEMPLATE)
            .map_err(|e| ServiceError::Template(e.to_string()))?;

        Ok(Self { registry })
    }

    /// Render the booking email; fields are HTML-escaped
    pub fn render_contact(
        &self,
        message: &ContactMessage,
        backend_url: &str,
    ) -> Result<String, ServiceError> {
        let vars = ContactVars {
            name: &message.name,
            email: &message.email,
            venue: message.venue.as_deref().unwrap_or(""),
            comment: &message.comment,
            backend_url,
        };

        self.registry
            .render("contact", &vars)
            .map_err(|e| ServiceError::Template(e.to_string()))
    }

    /// Render the booking email addressed to `to`
    pub fn contact_email(
        &self,
        to: &str,
        message: &ContactMessage,
        backend_url: &str,
    ) -> Result<OutgoingEmail, ServiceError> {
        Ok(OutgoingEmail {
            to: to.to_string(),
            subject: CONTACT_SUBJECT.to_string(),
            html: self.render_contact(message, backend_url)?,
        })
    }
}

fn uses_implicit_tls(port: u16) -> bool {
    port == IMPLICIT_TLS_PORT
}

/// Mailer sending through an authenticated SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, ServiceError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| ServiceError::Mail(format!("invalid sender {}: {e}", settings.from)))?;

        let relay = if uses_implicit_tls(settings.port) {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        };

        let transport = relay
            .map_err(|e| ServiceError::Mail(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| ServiceError::Mail(format!("invalid recipient {}: {e}", email.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| ServiceError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| ServiceError::Mail(e.to_string()))?;

        info!("Sent mail to {}", email.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            venue: Some("The Blue Room".to_string()),
            comment: "Can you play on Friday?".to_string(),
        }
    }

    #[test]
    fn test_render_contact() {
        let templates = EmailTemplates::new().unwrap();
        let html = templates
            .render_contact(&message(), "http://localhost:3000")
            .unwrap();

        assert!(html.contains("Ada"));
        assert!(html.contains("The Blue Room"));
        assert!(html.contains("Can you play on Friday?"));
        assert!(html.contains("http://localhost:3000/images/signatures"));
    }

    #[test]
    fn test_render_escapes_fields() {
        let templates = EmailTemplates::new().unwrap();
        let mut msg = message();
        msg.comment = "<script>alert(1)</script>".to_string();
        msg.venue = None;

        let html = templates.render_contact(&msg, "").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("Venue:"));
    }

    #[test]
    fn test_contact_email() {
        let templates = EmailTemplates::new().unwrap();
        let email = templates
            .contact_email("admin@example.com", &message(), "")
            .unwrap();

        assert_eq!(email.to, "admin@example.com");
        assert_eq!(email.subject, CONTACT_SUBJECT);
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        let settings = SmtpSettings {
            from: "not an address".to_string(),
            ..Default::default()
        };
        assert!(matches!(SmtpMailer::new(&settings), Err(ServiceError::Mail(_))));
    }

    #[tokio::test]
    async fn test_smtp_mailer_tls_modes() {
        assert!(uses_implicit_tls(465));
        assert!(!uses_implicit_tls(587));
        assert!(!uses_implicit_tls(25));

        for port in [465, 587] {
            let settings = SmtpSettings {
                host: "smtp.example.com".to_string(),
                port,
                from: "Bookings <noreply@example.com>".to_string(),
                ..Default::default()
            };
            assert!(SmtpMailer::new(&settings).is_ok(), "port {port}");
        }
    }
}
