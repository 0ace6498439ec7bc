//! Database table operations
//!
//! One table type per entity. Each exposes `select`, `insert`, `update` and
//! `delete` driven by a filter struct whose present fields become equality
//! conditions.

mod playlist_table;
mod show_table;
mod text_table;
mod user_table;

pub use playlist_table::{NewPlaylist, PlaylistFilter, PlaylistTable};
pub use show_table::{NewShow, ShowChanges, ShowFilter, ShowTable};
pub use text_table::{NewText, TextFilter, TextTable};
pub use user_table::{NewUser, UserChanges, UserFilter, UserTable};

use sqlx::{Encode, QueryBuilder, Sqlite, Type};

/// Timestamp written to `created_at` / `updated_at`
fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Appends ` WHERE a = ? AND b = ?` for every present value
struct Conditions<'q, 'args> {
    builder: &'q mut QueryBuilder<'args, Sqlite>,
    count: usize,
}

impl<'q, 'args> Conditions<'q, 'args> {
    fn new(builder: &'q mut QueryBuilder<'args, Sqlite>) -> Self {
        Self { builder, count: 0 }
    }

    fn eq<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Send + Type<Sqlite>,
    {
        if let Some(value) = value {
            self.builder
                .push(if self.count == 0 { " WHERE " } else { " AND " })
                .push(column)
                .push(" = ")
                .push_bind(value);
            self.count += 1;
        }
        self
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Appends `, column = ?` to an `UPDATE ... SET` for every present value
fn set<'args, T>(builder: &mut QueryBuilder<'args, Sqlite>, column: &'static str, value: Option<T>)
where
    T: 'args + Encode<'args, Sqlite> + Send + Type<Sqlite>,
{
    if let Some(value) = value {
        builder.push(", ").push(column).push(" = ").push_bind(value);
    }
}
