//! Database engine and connection management

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Database engine wrapper
pub struct DbEngine {
    pool: SqlitePool,
}

impl DbEngine {
    /// Open (creating if missing) the database at `url` and create its tables
    pub async fn connect(url: &str) -> Result<DbEngine> {
        // Create connection options with SQLite pragmas
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {url}"))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let engine = DbEngine { pool };
        engine.create_tables().await?;

        Ok(engine)
    }

    /// Private in-memory database with its tables created
    ///
    /// Every pooled connection to `:memory:` is a separate database, so the
    /// pool is pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<DbEngine> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let engine = DbEngine { pool };
        engine.create_tables().await?;

        Ok(engine)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn into_pool(self) -> SqlitePool {
        self.pool
    }

    /// Create all database tables
    async fn create_tables(&self) -> Result<()> {
        let pool = &self.pool;

        // User table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                password TEXT NOT NULL,
                admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Shows table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date TEXT,
                time TEXT,
                location TEXT,
                description TEXT,
                created_at TEXT,
                updated_at TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Text table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS text (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Playlist tables
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS spotify_playlists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                spotify_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT
            );
            CREATE TABLE IF NOT EXISTS youtube_playlists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                youtube_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Migration table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dbmigration (
                id INTEGER PRIMARY KEY,
                version INTEGER NOT NULL DEFAULT 0
            );
            INSERT OR IGNORE INTO dbmigration (id, version) VALUES (1, 0);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
