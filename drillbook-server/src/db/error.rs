//! Database error type

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("schema is missing constraints: {}", .0.join(", "))]
    MissingConstraints(Vec<&'static str>),
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Error reported by the server itself (constraint, type, length...),
    /// as opposed to pool, I/O or decoding failures.
    pub fn as_database_error(&self) -> Option<&(dyn sqlx::error::DatabaseError + 'static)> {
        match self {
            Self::Sqlx(sqlx::Error::Database(e)) => Some(e.as_ref()),
            _ => None,
        }
    }
}
