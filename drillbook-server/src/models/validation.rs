//! Validation error types

use std::fmt;

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., contains a reserved character)
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl ValidationError {
    /// Name of the field that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }

    /// Human message without the field name, e.g. "cannot be empty".
    pub fn message(&self) -> String {
        match self {
            Self::Empty { .. } => "cannot be empty".to_owned(),
            Self::TooLong { max, .. } => {
                format!("exceeds maximum length of {} characters", max)
            }
            Self::InvalidFormat { reason, .. } => (*reason).to_owned(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field(), self.message())
    }
}

impl std::error::Error for ValidationError {}

/// A validation error located at a field path (e.g. `instructions[1].description`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub error: ValidationError,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.error.message())
    }
}

/// Every field violation found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at its own field name.
    pub fn push(&mut self, error: ValidationError) {
        self.push_at(error.field().to_owned(), error);
    }

    /// Record an error at an explicit path.
    pub fn push_at(&mut self, path: String, error: ValidationError) {
        self.0.push(Violation { path, error });
    }

    /// Keep the value on success, record the error otherwise.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    /// Merge violations of a list element under `prefix[index]`.
    pub fn nested(&mut self, prefix: &str, index: usize, inner: Violations) {
        for v in inner.0 {
            self.0.push(Violation {
                path: format!("{}[{}].{}", prefix, index, v.path),
                error: v.error,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Violations> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for Violations {
    fn from(error: ValidationError) -> Self {
        let mut v = Self::new();
        v.push(error);
        v
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}
