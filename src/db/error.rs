//! Typed outcomes of data-access operations

use thiserror::Error;

/// Error returned by table operations
#[derive(Debug, Error)]
pub enum DbError {
    /// A unique index rejected the write
    #[error("duplicate record (field `{field}`)")]
    Duplicate { field: String },

    /// An update matched no rows
    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl DbError {
    /// Classify an error raised by an insert or update
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DbError::Duplicate {
                    field: unique_field(db_err.message()),
                };
            }
        }

        DbError::Database(err)
    }
}

/// Column named in a SQLite unique violation, e.g.
/// `UNIQUE constraint failed: users.email` yields `email`
fn unique_field(message: &str) -> String {
    message
        .rsplit(':')
        .next()
        .and_then(|cols| cols.split(',').next())
        .and_then(|col| col.trim().rsplit('.').next())
        .filter(|col| !col.is_empty())
        .unwrap_or("id")
        .to_string()
}
