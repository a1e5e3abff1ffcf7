//! User-facing messages for persistence and validation failures
//!
//! Pure text transforms: no I/O, no state.

use crate::db::Constraint;
use crate::models::Violations;

/// Message used whenever nothing more specific is known.
pub const GENERIC_MESSAGE: &str = "An error has occurred.";

/// What failed.
#[derive(Debug, Clone, Copy)]
pub enum FailureSource<'a> {
    /// Constraint violation reported by the store, with the constraint
    /// name when the store provided one
    Constraint(Option<&'a str>),
    /// Field-level validation failures
    Fields(&'a Violations),
}

impl<'a> From<&'a Violations> for FailureSource<'a> {
    fn from(v: &'a Violations) -> Self {
        Self::Fields(v)
    }
}

pub fn to_user_message(source: FailureSource<'_>) -> String {
    match source {
        FailureSource::Constraint(name) => constraint_message(name).to_owned(),
        FailureSource::Fields(v) => violations_message(v),
    }
}

/// Message for a violated constraint, generic when unknown.
pub fn constraint_message(name: Option<&str>) -> &'static str {
    name.and_then(Constraint::from_name)
        .map(Constraint::message)
        .unwrap_or(GENERIC_MESSAGE)
}

/// One sentence per violation, `"<Field> <message>."`, space-separated.
pub fn violations_message(v: &Violations) -> String {
    if v.is_empty() {
        return GENERIC_MESSAGE.to_owned();
    }

    v.iter()
        .map(|violation| format!("{} {}.", capitalize(&violation.path), violation.error.message()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
