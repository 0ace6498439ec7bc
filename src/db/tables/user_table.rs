//! User table operations

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{now, set, Conditions};
use crate::db::{DbError, DbResult};
use crate::models::User;
use crate::utils::auth::{hash_password, verify_password};

/// Database row for users table
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    admin: bool,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password: self.password,
            admin: self.admin,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub admin: Option<bool>,
}

impl UserFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_username(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            ..Default::default()
        }
    }

    pub fn by_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> bool {
        let mut conditions = Conditions::new(builder);
        conditions
            .eq("id", self.id)
            .eq("username", self.username.clone())
            .eq("email", self.email.clone())
            .eq("admin", self.admin);
        !conditions.is_empty()
    }
}

/// A user to be created; `password` is plain text and hashed on insert
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub admin: bool,
}

/// Columns to overwrite; a present `password` is plain text and hashed
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub admin: Option<bool>,
}

/// User table operations
pub struct UserTable;

impl UserTable {
    pub async fn select(pool: &SqlitePool, filter: &UserFilter) -> DbResult<Vec<User>> {
        let mut builder = QueryBuilder::new("SELECT id, username, email, password, admin FROM users");
        filter.apply(&mut builder);
        builder.push(" ORDER BY id");

        let rows: Vec<UserRow> = builder.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    /// Insert a user, hashing the password first
    ///
    /// A taken username or email is `DbError::Duplicate`.
    pub async fn insert(pool: &SqlitePool, user: &NewUser) -> DbResult<User> {
        let stamp = now();
        let password = hash_password(&user.password);

        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, email, password, admin, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, username, email, password, admin",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&password)
        .bind(user.admin)
        .bind(&stamp)
        .bind(&stamp)
        .fetch_one(pool)
        .await
        .map_err(DbError::from_write)?;

        Ok(row.into_user())
    }

    pub async fn update(
        pool: &SqlitePool,
        filter: &UserFilter,
        changes: &UserChanges,
    ) -> DbResult<Vec<User>> {
        let mut builder = QueryBuilder::new("UPDATE users SET updated_at = ");
        builder.push_bind(now());
        set(&mut builder, "username", changes.username.clone());
        set(&mut builder, "email", changes.email.clone());
        set(&mut builder, "password", changes.password.as_deref().map(hash_password));
        set(&mut builder, "admin", changes.admin);

        if !filter.apply(&mut builder) {
            return Err(DbError::NotFound);
        }
        builder.push(" RETURNING id, username, email, password, admin");

        let rows: Vec<UserRow> = builder
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(DbError::from_write)?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    #[cfg(test)]
    pub async fn delete(pool: &SqlitePool, filter: &UserFilter) -> DbResult<u64> {
        let mut builder = QueryBuilder::new("DELETE FROM users");
        if !filter.apply(&mut builder) {
            return Ok(0);
        }

        Ok(builder.build().execute(pool).await?.rows_affected())
    }

    /// Check a user's password; unknown users are simply invalid
    pub async fn validate_password(
        pool: &SqlitePool,
        username: &str,
        password: &str,
    ) -> DbResult<bool> {
        let users = Self::select(pool, &UserFilter::by_username(username)).await?;

        Ok(match users.as_slice() {
            [user] => verify_password(password, &user.password),
            _ => false,
        })
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

    fn singer() -> NewUser {
        NewUser {
            username: "singer".to_string(),
            email: "singer@example.com".to_string(),
            password: "s3cret!".to_string(),
            admin: true,
        }
    }

    #[tokio::test]
    async fn test_insert_hashes_password() {
        let pool = pool().await;
        let user = UserTable::insert(&pool, &singer()).await.unwrap();

        assert_ne!(user.password, "s3cret!");
        assert!(user.admin);
        assert!(UserTable::validate_password(&pool, "singer", "s3cret!").await.unwrap());
        assert!(!UserTable::validate_password(&pool, "singer", "wrong").await.unwrap());
        assert!(!UserTable::validate_password(&pool, "nobody", "s3cret!").await.unwrap());
    }

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let pool = pool().await;
        UserTable::insert(&pool, &singer()).await.unwrap();

        let mut same_email = singer();
        same_email.username = "other".to_string();
        let err = UserTable::insert(&pool, &same_email).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { ref field } if field == "email"));

        let mut same_name = singer();
        same_name.email = "other@example.com".to_string();
        let err = UserTable::insert(&pool, &same_name).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { ref field } if field == "username"));

        let all = UserTable::select(&pool, &UserFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_admin_filter() {
        let pool = pool().await;
        let user = UserTable::insert(&pool, &singer()).await.unwrap();

        let updated = UserTable::update(
            &pool,
            &UserFilter::by_id(user.id),
            &UserChanges {
                email: Some("new@example.com".to_string()),
                password: Some("n3w-pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated[0].email, "new@example.com");
        assert_eq!(updated[0].username, "singer");
        assert!(UserTable::validate_password(&pool, "singer", "n3w-pass").await.unwrap());

        let admins = UserTable::select(
            &pool,
            &UserFilter {
                username: Some("singer".to_string()),
                admin: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(admins.len(), 1);

        assert_eq!(UserTable::delete(&pool, &UserFilter::by_id(user.id)).await.unwrap(), 1);
    }
}
