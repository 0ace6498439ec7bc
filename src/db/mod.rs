//! Database module for the band site
//!
//! This module handles all database operations using SQLx with SQLite.

mod engine;
mod error;
mod migrations;
pub mod tables;

pub use engine::DbEngine;
pub use error::{DbError, DbResult};
pub use migrations::run_migrations;
pub use tables::*;
