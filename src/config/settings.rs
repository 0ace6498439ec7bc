//! Runtime settings for the backend
//!
//! Settings come from built-in defaults, an optional TOML file and
//! `BANDSITE_`-prefixed environment variables, in that order of precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `BANDSITE_JWT_KEY`
pub const ENV_PREFIX: &str = "BANDSITE";

/// Spotify artist whose albums are proxied by default
pub const DEFAULT_ARTIST_ID: &str = "63GbQYzf0EbxtI9D23IdrU";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Spotify client-credentials settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub accounts_url: String,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_url: "https://api.spotify.com/v1".to_string(),
            accounts_url: "https://accounts.spotify.com".to_string(),
        }
    }
}

/// YouTube data API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    pub api_key: String,
    pub api_url: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }
}

/// Mail relay used by the contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            username: String::new(),
            password: String::new(),
            from: "Tctrio Notification Service <noreply@localhost>".to_string(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deployment environment; signup is disabled in production
    pub environment: Environment,

    /// sqlx connection url
    pub database_url: String,

    /// Secret for signing session tokens
    pub jwt_key: String,

    /// Origin allowed by CORS (credentials enabled)
    pub client_host: String,

    /// Directory holding static assets such as the signature image
    pub static_dir: PathBuf,

    /// Spotify artist id for album listings
    pub artist_id: String,

    /// Username of the account receiving contact-form mail
    pub site_admin: String,

    /// Backend url embedded in the contact email while developing
    pub dev_backend_url: Option<String>,

    pub spotify: SpotifySettings,
    pub youtube: YoutubeSettings,
    pub smtp: SmtpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            database_url: "sqlite:bandsite.db".to_string(),
            jwt_key: String::new(),
            client_host: "http://localhost:8000".to_string(),
            static_dir: PathBuf::from("static"),
            artist_id: DEFAULT_ARTIST_ID.to_string(),
            site_admin: String::new(),
            dev_backend_url: None,
            spotify: SpotifySettings::default(),
            youtube: YoutubeSettings::default(),
            smtp: SmtpSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")?;

        Ok(settings)
    }

    /// Path of the signature image served by `/images/signatures`
    pub fn signature_path(&self) -> PathBuf {
        self.static_dir.join("sig_white.png")
    }

    /// Backend url rendered into emails; empty outside development
    pub fn email_backend_url(&self) -> &str {
        match self.environment {
            Environment::Development => self.dev_backend_url.as_deref().unwrap_or(""),
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Development);
        assert_eq!(settings.artist_id, DEFAULT_ARTIST_ID);
        assert_eq!(settings.client_host, "http://localhost:8000");
        assert!(settings.signature_path().ends_with("sig_white.png"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
environment = "production"
jwt_key = "secret"
site_admin = "admin"

[spotify]
client_id = "abc"
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.jwt_key, "secret");
        assert_eq!(settings.site_admin, "admin");
        assert_eq!(settings.spotify.client_id, "abc");
        // untouched nested fields keep their defaults
        assert_eq!(settings.spotify.api_url, "https://api.spotify.com/v1");
        assert_eq!(settings.email_backend_url(), "");
    }
}
