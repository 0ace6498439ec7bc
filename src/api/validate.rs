//! Request field validation
//!
//! Handlers run every check they need on a `Validator`, then call
//! `finish()` to turn the collected failures into a single 400.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::errors::{ApiError, FieldError};
use crate::utils::dates::parse_iso_date;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").unwrap());

/// An id that may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LenientId {
    Int(i64),
    Text(String),
}

impl LenientId {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LenientId::Int(id) => Some(*id),
            LenientId::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// A trimmed value, with blank strings counted as absent
pub fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: Option<&str>, message: &str) {
        self.errors.push(FieldError::new(message, field));
    }

    /// Non-blank after trimming; returns the trimmed value
    pub fn required(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        let value = trimmed(value);
        if value.is_none() {
            self.fail(Some(field), message);
        }
        value
    }

    /// Present in the body, possibly empty; returned untouched
    pub fn present(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        if value.is_none() {
            self.fail(Some(field), message);
        }
        value.map(str::to_string)
    }

    pub fn email(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        match value.map(str::trim) {
            Some(email) if EMAIL_RE.is_match(email) => Some(email.to_string()),
            _ => {
                self.fail(Some(field), message);
                None
            }
        }
    }

    /// Trimmed length within `min..=max` characters
    pub fn length(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
        message: &str,
    ) -> Option<String> {
        let value = value.map(str::trim).unwrap_or_default();
        let len = value.chars().count();

        if (min..=max).contains(&len) {
            Some(value.to_string())
        } else {
            self.fail(Some(field), message);
            None
        }
    }

    /// At least one of the values is non-blank
    pub fn one_of(&mut self, values: &[Option<&str>], message: &str) {
        if values.iter().all(|v| trimmed(*v).is_none()) {
            self.fail(None, message);
        }
    }

    /// Optional ISO 8601 date; absent or blank is fine, garbage is not
    pub fn iso_date(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<NaiveDate> {
        let raw = trimmed(value)?;
        let date = parse_iso_date(&raw);
        if date.is_none() {
            self.fail(Some(field), message);
        }
        date
    }

    pub fn integer(&mut self, field: &str, value: Option<&LenientId>, message: &str) -> Option<i64> {
        let id = value.and_then(LenientId::as_i64);
        if id.is_none() {
            self.fail(Some(field), message);
        }
        id
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}
