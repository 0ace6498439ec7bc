//! Utility modules for the band site backend

pub mod auth;
pub mod dates;
