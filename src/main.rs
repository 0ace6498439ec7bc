//! Band site backend
//!
//! REST API behind a musical act's promotional website: accounts, show
//! listings, about text, curated Spotify/YouTube playlists, a contact form
//! and a Spotify album proxy.

mod api;
mod config;
mod db;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Settings;
use crate::db::{run_migrations, DbEngine};
use crate::state::AppState;

/// Band site backend
#[derive(Parser, Debug)]
#[command(name = "bandsite")]
#[command(version)]
#[command(about = "REST backend for a band's promotional website")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Create tables, run migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // RUST_LOG wins over --debug
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{log_level},sqlx=warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let settings = Settings::load(args.config.as_deref())?;
    info!(
        "bandsite v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        settings.environment.as_str()
    );

    if settings.jwt_key.is_empty() {
        warn!("No jwt key configured; sign-in and sessions will fail");
    }

    let engine = DbEngine::connect(&settings.database_url).await?;
    run_migrations(engine.pool())
        .await
        .context("Failed to run migrations")?;

    if args.migrate_only {
        info!("Migrations complete");
        return Ok(());
    }

    let state = web::Data::new(AppState::new(settings, engine.into_pool())?);

    // fetch the first spotify token ahead of the first request
    let warm = state.clone();
    tokio::spawn(async move {
        if let Err(e) = warm.spotify.token().await {
            warn!("Could not fetch initial spotify token: {}", e);
        }
    });

    start_server(state, &args.host, args.port).await
}

async fn start_server(state: web::Data<AppState>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let client_host = state.settings.client_host.clone();
    info!("Allowing CORS requests from {}", client_host);
    info!("Server listening on http://{}", addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&client_host)
            .supports_credentials()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(api::configure)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {addr}"))?
    .run()
    .await?;

    Ok(())
}
