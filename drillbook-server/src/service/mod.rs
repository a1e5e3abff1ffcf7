//! Service layer
//!
//! Thin orchestration over the repositories. Failed writes are normalized
//! here: constraint violations become a [`DatabaseInsertError`] carrying a
//! translated message, every other failure stays a [`DbError`].

pub mod drills;
pub mod tags;

pub use drills::{save_with, DrillService};
pub use tags::TagService;

use sqlx::error::{DatabaseError, ErrorKind};

use crate::db::DbError;
use crate::translate::{to_user_message, FailureSource};

/// A save rejected by the store (uniqueness, foreign key, key shape).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DatabaseInsertError {
    message: String,
    #[source]
    source: DbError,
}

impl DatabaseInsertError {
    /// Translated, user-facing message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Insert(#[from] DatabaseInsertError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    /// Classify the error of a failed write.
    ///
    /// Only constraint violations become [`DatabaseInsertError`]; deadlocks,
    /// timeouts and other server-side failures stay [`ServiceError::Db`].
    pub fn from_write(e: DbError) -> Self {
        let message = e
            .as_database_error()
            .filter(|db| is_constraint_violation(*db))
            .map(|db| {
                tracing::warn!(
                    constraint = db.constraint().unwrap_or("-"),
                    error = %db,
                    "write rejected by database"
                );
                to_user_message(FailureSource::Constraint(db.constraint()))
            });

        match message {
            Some(message) => Self::Insert(DatabaseInsertError { message, source: e }),
            None => Self::Db(e),
        }
    }
}

fn is_constraint_violation(db: &dyn DatabaseError) -> bool {
    db.constraint().is_some()
        || matches!(
            db.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
        )
}
