//! Text table operations

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{now, Conditions};
use crate::db::{DbError, DbResult};
use crate::models::TextBlock;

#[derive(Debug, FromRow)]
struct TextRow {
    id: i64,
    name: String,
    text: String,
}

impl TextRow {
    fn into_text(self) -> TextBlock {
        TextBlock {
            id: self.id,
            name: self.name,
            text: self.text,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl TextFilter {
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> bool {
        let mut conditions = Conditions::new(builder);
        conditions.eq("id", self.id).eq("name", self.name.clone());
        !conditions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NewText {
    pub name: String,
    pub text: String,
}

/// Text table operations
pub struct TextTable;

impl TextTable {
    pub async fn select(pool: &SqlitePool, filter: &TextFilter) -> DbResult<Vec<TextBlock>> {
        let mut builder = QueryBuilder::new("SELECT id, name, text FROM text");
        filter.apply(&mut builder);
        builder.push(" ORDER BY id");

        let rows: Vec<TextRow> = builder.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(|r| r.into_text()).collect())
    }

    /// Insert a text block; a taken name is `DbError::Duplicate`
    pub async fn insert(pool: &SqlitePool, text: &NewText) -> DbResult<TextBlock> {
        let stamp = now();

        let row: TextRow = sqlx::query_as(
            "INSERT INTO text (name, text, created_at, updated_at) VALUES (?, ?, ?, ?) \
             RETURNING id, name, text",
        )
        .bind(&text.name)
        .bind(&text.text)
        .bind(&stamp)
        .bind(&stamp)
        .fetch_one(pool)
        .await
        .map_err(DbError::from_write)?;

        Ok(row.into_text())
    }

    /// Replace the text of matching blocks
    pub async fn update(
        pool: &SqlitePool,
        filter: &TextFilter,
        text: &str,
    ) -> DbResult<Vec<TextBlock>> {
        let mut builder = QueryBuilder::new("UPDATE text SET updated_at = ");
        builder.push_bind(now());
        builder.push(", text = ").push_bind(text.to_string());

        if !filter.apply(&mut builder) {
            return Err(DbError::NotFound);
        }
        builder.push(" RETURNING id, name, text");

        let rows: Vec<TextRow> = builder
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(DbError::from_write)?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }

        Ok(rows.into_iter().map(|r| r.into_text()).collect())
    }

    pub async fn delete(pool: &SqlitePool, filter: &TextFilter) -> DbResult<u64> {
        let mut builder = QueryBuilder::new("DELETE FROM text");
        if !filter.apply(&mut builder) {
            return Ok(0);
        }

        Ok(builder.build().execute(pool).await?.rows_affected())
    }
}
