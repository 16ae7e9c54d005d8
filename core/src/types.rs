//! Domain DTOs for the todo API.
//!
//! # Design
//! These mirror the todo schema. `Date` is carried as its wire string; the
//! binding layer never validates shapes, so `is_valid` is offered for
//! callers (the mock store uses it) rather than enforced on decode.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}-[0-9]{2}-[0-9]{4})$").expect("date pattern is valid")
});

/// A calendar date in `dd-mm-yyyy` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(String);

impl Date {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks the `dd-mm-yyyy` shape only, not that the day exists.
    pub fn is_valid(&self) -> bool {
        DATE_FORMAT.is_match(&self.0)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub description: String,
    pub done: bool,
    pub date: Date,
}

/// Payload for creating or replacing a todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoInput {
    pub description: String,
    pub done: bool,
    pub date: Date,
}

/// Body of a declared failure response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoError {
    pub reason: String,
}

impl TodoError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
