//! Configuration module for the band site backend
//!
//! This module contains the application settings and their loading rules.

mod settings;

pub use settings::{Environment, Settings, SmtpSettings, SpotifySettings, YoutubeSettings};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "x2f01";

/// Session lifetime in seconds
pub const SESSION_MAX_AGE: i64 = 3600;

/// Name of the text block holding the about page
pub const ABOUT_NAME: &str = "about";
