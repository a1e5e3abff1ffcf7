//! Bounded text fields shared by drills, tags and instructions
//!
//! Lengths are counted in characters to match the VARCHAR columns.

use super::ValidationError;

/// Maximum length for drill, category and sub-category names
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length for tag and instruction descriptions
pub const MAX_DESCRIPTION_LEN: usize = 511;

/// Maximum length for external video identifiers
pub const MAX_VIDEO_ID_LEN: usize = 127;

/// Character that joined steps in the legacy wire encoding.
pub const STEP_DELIMITER: char = '|';

/// Trim, reject blank, enforce `max`.
fn bounded(field: &'static str, s: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(trimmed.to_owned())
}

/// Validated name of a drill, category or sub-category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Create a new name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 255 characters
    ///
    /// # Example
    /// ```
    /// use drillbook_server::models::EntityName;
    ///
    /// assert!(EntityName::new("Kicks").is_ok());
    /// assert!(EntityName::new("").is_err());
    /// assert!(EntityName::new("   ").is_err());  // whitespace only
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded("name", s, MAX_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated description (1-511 characters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded("description", s, MAX_DESCRIPTION_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Identifier in the external video system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    /// Blank input means "no video" and yields `Ok(None)`.
    pub fn parse(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => bounded("video_id", v, MAX_VIDEO_ID_LEN).map(|v| Some(Self(v))),
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// One step of an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step(String);

impl Step {
    /// Steps may hold any text except the legacy `|` delimiter.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.contains(STEP_DELIMITER) {
            return Err(ValidationError::InvalidFormat {
                field: "steps",
                reason: "must not contain the '|' character",
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
