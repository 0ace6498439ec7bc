//! Show table operations

use chrono::NaiveDate;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{now, set, Conditions};
use crate::db::{DbError, DbResult};
use crate::models::Show;
use crate::utils::dates::{date_from_db, date_to_db};

/// Database row for shows table
#[derive(Debug, FromRow)]
struct ShowRow {
    id: i64,
    name: String,
    date: Option<String>,
    time: Option<String>,
    location: Option<String>,
    description: Option<String>,
}

impl ShowRow {
    fn into_show(self) -> Show {
        let date = self.date.as_deref().and_then(|d| {
            let parsed = date_from_db(d);
            if parsed.is_none() {
                tracing::warn!("Show {} has unreadable date {:?}", self.id, d);
            }
            parsed
        });

        Show {
            id: self.id,
            name: self.name,
            date,
            time: self.time,
            location: self.location,
            description: self.description,
        }
    }
}

/// Columns a show lookup can match on
#[derive(Debug, Clone, Default)]
pub struct ShowFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl ShowFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> bool {
        let mut conditions = Conditions::new(builder);
        conditions
            .eq("id", self.id)
            .eq("name", self.name.clone())
            .eq("date", self.date.map(date_to_db))
            .eq("location", self.location.clone());
        !conditions.is_empty()
    }
}

/// A show to be created
#[derive(Debug, Clone, Default)]
pub struct NewShow {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Columns to overwrite; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ShowChanges {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Show table operations
pub struct ShowTable;

impl ShowTable {
    /// Shows matching the filter, oldest first
    pub async fn select(pool: &SqlitePool, filter: &ShowFilter) -> DbResult<Vec<Show>> {
        let mut builder =
            QueryBuilder::new("SELECT id, name, date, time, location, description FROM shows");
        filter.apply(&mut builder);
        builder.push(" ORDER BY id");

        let rows: Vec<ShowRow> = builder.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(|r| r.into_show()).collect())
    }

    /// Insert a show and return it as stored
    pub async fn insert(pool: &SqlitePool, show: &NewShow) -> DbResult<Show> {
        let stamp = now();

        let row: ShowRow = sqlx::query_as(
            "INSERT INTO shows (name, date, time, location, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, name, date, time, location, description",
        )
        .bind(&show.name)
        .bind(show.date.map(date_to_db))
        .bind(&show.time)
        .bind(&show.location)
        .bind(&show.description)
        .bind(&stamp)
        .bind(&stamp)
        .fetch_one(pool)
        .await
        .map_err(DbError::from_write)?;

        Ok(row.into_show())
    }

    /// Apply `changes` to every matching show and return the updated rows
    ///
    /// An empty filter matches nothing.
    pub async fn update(
        pool: &SqlitePool,
        filter: &ShowFilter,
        changes: &ShowChanges,
    ) -> DbResult<Vec<Show>> {
        let mut builder = QueryBuilder::new("UPDATE shows SET updated_at = ");
        builder.push_bind(now());
        set(&mut builder, "name", changes.name.clone());
        set(&mut builder, "date", changes.date.map(date_to_db));
        set(&mut builder, "time", changes.time.clone());
        set(&mut builder, "location", changes.location.clone());
        set(&mut builder, "description", changes.description.clone());

        if !filter.apply(&mut builder) {
            return Err(DbError::NotFound);
        }
        builder.push(" RETURNING id, name, date, time, location, description");

        let rows: Vec<ShowRow> = builder
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(DbError::from_write)?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }

        Ok(rows.into_iter().map(|r| r.into_show()).collect())
    }

    /// Delete matching shows, returning how many were removed
    ///
    /// An empty filter matches nothing.
    pub async fn delete(pool: &SqlitePool, filter: &ShowFilter) -> DbResult<u64> {
        let mut builder = QueryBuilder::new("DELETE FROM shows");
        if !filter.apply(&mut builder) {
            return Ok(0);
        }

        let result = builder.build().execute(pool).await?;

        Ok(result.rows_affected())
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

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_select_date_roundtrip() {
        let pool = pool().await;
        let inserted = ShowTable::insert(
            &pool,
            &NewShow {
                name: "Jazz night".to_string(),
                date: Some(ymd(2024, 11, 3)),
                location: Some("Blue Room".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(inserted.id > 0);
        assert_eq!(inserted.date, Some(ymd(2024, 11, 3)));

        let selected = ShowTable::select(&pool, &ShowFilter::by_id(inserted.id))
            .await
            .unwrap();
        assert_eq!(selected, vec![inserted]);

        let by_date = ShowTable::select(
            &pool,
            &ShowFilter {
                date: Some(ymd(2024, 11, 3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_date.len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_absent_columns() {
        let pool = pool().await;
        let show = ShowTable::insert(
            &pool,
            &NewShow {
                name: "Matinee".to_string(),
                time: Some("3pm".to_string()),
                description: Some("All ages".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = ShowTable::update(
            &pool,
            &ShowFilter::by_id(show.id),
            &ShowChanges {
                name: Some("Evening set".to_string()),
                date: Some(ymd(2025, 1, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name, "Evening set");
        assert_eq!(updated[0].date, Some(ymd(2025, 1, 2)));
        assert_eq!(updated[0].time.as_deref(), Some("3pm"));
        assert_eq!(updated[0].description.as_deref(), Some("All ages"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let pool = pool().await;
        let result = ShowTable::update(
            &pool,
            &ShowFilter::by_id(404),
            &ShowChanges {
                name: Some("Nope".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(DbError::NotFound)));

        let result = ShowTable::update(&pool, &ShowFilter::default(), &ShowChanges::default()).await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_counts() {
        let pool = pool().await;
        let show = ShowTable::insert(
            &pool,
            &NewShow {
                name: "Festival".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(ShowTable::delete(&pool, &ShowFilter::default()).await.unwrap(), 0);
        assert_eq!(ShowTable::delete(&pool, &ShowFilter::by_id(show.id)).await.unwrap(), 1);
        assert_eq!(ShowTable::delete(&pool, &ShowFilter::by_id(show.id)).await.unwrap(), 0);
        assert!(ShowTable::select(&pool, &ShowFilter::default()).await.unwrap().is_empty());
    }
}
