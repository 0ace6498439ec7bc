//! Playlist table operations
//!
//! Spotify and YouTube playlists live in separate tables with the same
//! shape; `PlaylistSource` picks the table and id column.

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{now, Conditions};
use crate::db::{DbError, DbResult};
use crate::models::{Playlist, PlaylistSource};

#[derive(Debug, FromRow)]
struct PlaylistRow {
    id: i64,
    external_id: String,
    name: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistFilter {
    pub id: Option<i64>,
    pub external_id: Option<String>,
    pub name: Option<String>,
}

impl PlaylistFilter {
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn by_external_id(external_id: &str) -> Self {
        Self {
            external_id: Some(external_id.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub external_id: String,
    pub name: String,
}

/// Playlist table operations for one source
#[derive(Debug, Clone, Copy)]
pub struct PlaylistTable {
    source: PlaylistSource,
}

impl PlaylistTable {
    pub fn new(source: PlaylistSource) -> Self {
        Self { source }
    }

    #[cfg(test)]
    pub fn spotify() -> Self {
        Self::new(PlaylistSource::Spotify)
    }

    #[cfg(test)]
    pub fn youtube() -> Self {
        Self::new(PlaylistSource::Youtube)
    }

    fn into_playlist(&self, row: PlaylistRow) -> Playlist {
        Playlist {
            id: row.id,
            source: self.source,
            external_id: row.external_id,
            name: row.name,
        }
    }

    fn returning(&self) -> String {
        format!(" RETURNING id, {} AS external_id, name", self.source.id_column())
    }

    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>, filter: &PlaylistFilter) -> bool {
        let mut conditions = Conditions::new(builder);
        conditions
            .eq("id", filter.id)
            .eq(self.source.id_column(), filter.external_id.clone())
            .eq("name", filter.name.clone());
        !conditions.is_empty()
    }

    pub async fn select(&self, pool: &SqlitePool, filter: &PlaylistFilter) -> DbResult<Vec<Playlist>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT id, {} AS external_id, name FROM {}",
            self.source.id_column(),
            self.source.table()
        ));
        self.apply(&mut builder, filter);
        builder.push(" ORDER BY id");

        let rows: Vec<PlaylistRow> = builder.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(|r| self.into_playlist(r)).collect())
    }

    /// Insert a playlist; a taken name is `DbError::Duplicate`
    pub async fn insert(&self, pool: &SqlitePool, playlist: &NewPlaylist) -> DbResult<Playlist> {
        let stamp = now();
        let sql = format!(
            "INSERT INTO {} ({}, name, created_at, updated_at) VALUES (?, ?, ?, ?){}",
            self.source.table(),
            self.source.id_column(),
            self.returning()
        );

        let row: PlaylistRow = sqlx::query_as(&sql)
            .bind(&playlist.external_id)
            .bind(&playlist.name)
            .bind(&stamp)
            .bind(&stamp)
            .fetch_one(pool)
            .await
            .map_err(DbError::from_write)?;

        Ok(self.into_playlist(row))
    }

    /// Point matching playlists at a new external id
    pub async fn update(
        &self,
        pool: &SqlitePool,
        filter: &PlaylistFilter,
        external_id: &str,
    ) -> DbResult<Vec<Playlist>> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} SET updated_at = ", self.source.table()));
        builder.push_bind(now());
        builder
            .push(", ")
            .push(self.source.id_column())
            .push(" = ")
            .push_bind(external_id.to_string());

        if !self.apply(&mut builder, filter) {
            return Err(DbError::NotFound);
        }
        builder.push(self.returning());

        let rows: Vec<PlaylistRow> = builder
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(DbError::from_write)?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }

        Ok(rows.into_iter().map(|r| self.into_playlist(r)).collect())
    }

    pub async fn delete(&self, pool: &SqlitePool, filter: &PlaylistFilter) -> DbResult<u64> {
        let mut builder = QueryBuilder::new(format!("DELETE FROM {}", self.source.table()));
        if !self.apply(&mut builder, filter) {
            return Ok(0);
        }

        Ok(builder.build().execute(pool).await?.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{run_migrations, DbEngine};

    async fn pool() -> SqlitePool {
        let engine = DbEngine::in_memory().await.unwrap();
        run_migrations(engine.pool()).await.unwrap();
        engine.into_pool()
    }

    fn new(external_id: &str, name: &str) -> NewPlaylist {
        NewPlaylist {
            external_id: external_id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sources_are_separate_tables() {
        let pool = pool().await;
        PlaylistTable::spotify().insert(&pool, &new("sp1", "highlights")).await.unwrap();
        PlaylistTable::youtube().insert(&pool, &new("yt1", "highlights")).await.unwrap();

        let spotify = PlaylistTable::spotify()
            .select(&pool, &PlaylistFilter::by_name("highlights"))
            .await
            .unwrap();
        assert_eq!(spotify.len(), 1);
        assert_eq!(spotify[0].external_id, "sp1");
        assert_eq!(spotify[0].source, PlaylistSource::Spotify);

        let youtube = PlaylistTable::youtube()
            .select(&pool, &PlaylistFilter::by_external_id("yt1"))
            .await
            .unwrap();
        assert_eq!(youtube[0].name, "highlights");
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let pool = pool().await;
        let table = PlaylistTable::spotify();
        table.insert(&pool, &new("a", "live")).await.unwrap();

        let dup = table.insert(&pool, &new("b", "live")).await;
        assert!(matches!(dup, Err(DbError::Duplicate { ref field }) if field == "name"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = pool().await;
        let table = PlaylistTable::youtube();
        table.insert(&pool, &new("old", "sessions")).await.unwrap();

        let updated = table
            .update(&pool, &PlaylistFilter::by_name("sessions"), "new")
            .await
            .unwrap();
        assert_eq!(updated[0].external_id, "new");

        let missing = table.update(&pool, &PlaylistFilter::by_name("nope"), "x").await;
        assert!(matches!(missing, Err(DbError::NotFound)));

        assert_eq!(
            table.delete(&pool, &PlaylistFilter::by_external_id("new")).await.unwrap(),
            1
        );
    }
}
