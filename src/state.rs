//! Shared application state handed to every handler

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::{EmailTemplates, Mailer, SmtpMailer, SpotifyClient, YoutubeClient};

pub struct AppState {
    pub pool: SqlitePool,
    pub settings: Settings,
    pub spotify: SpotifyClient,
    pub youtube: YoutubeClient,
    pub mailer: Arc<dyn Mailer>,
    pub templates: EmailTemplates,
}

impl AppState {
    /// Build the state with an SMTP mailer from the settings
    pub fn new(settings: Settings, pool: SqlitePool) -> Result<Self> {
        let mailer = SmtpMailer::new(&settings.smtp).context("Failed to set up mail relay")?;
        Self::with_mailer(settings, pool, Arc::new(mailer))
    }

    pub fn with_mailer(settings: Settings, pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let spotify =
            SpotifyClient::new(settings.spotify.clone()).context("Failed to build spotify client")?;
        let youtube =
            YoutubeClient::new(settings.youtube.clone()).context("Failed to build youtube client")?;
        let templates = EmailTemplates::new().context("Failed to compile email templates")?;

        Ok(Self {
            pool,
            settings,
            spotify,
            youtube,
            mailer,
            templates,
        })
    }
}
