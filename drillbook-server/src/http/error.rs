//! API error types with IntoResponse
//!
//! Errors are converted to `{error, message}` JSON bodies with matching
//! status codes. Database failures are logged and answered generically.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::Violations;
use crate::service::{DatabaseInsertError, ServiceError};
use crate::translate::{to_user_message, GENERIC_MESSAGE};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Field validation failed (400)
    Validation(Violations),

    /// Store rejected a save (400)
    Insert(DatabaseInsertError),

    /// Malformed request: body, path segment, id mismatch (400)
    BadRequest { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Body id disagrees with the path id.
    pub fn id_mismatch(path_id: i64, body_id: i64) -> Self {
        Self::BadRequest {
            message: format!("Id {} in body does not match id {} in path.", body_id, path_id),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Insert(_) | Self::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(v) => json!({
                "error": "validation_error",
                "message": to_user_message(v.into())
            }),
            Self::Insert(e) => json!({
                "error": "database_insert_error",
                "message": e.message()
            }),
            Self::BadRequest { message } => json!({
                "error": "bad_request",
                "message": message
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "Database error");
                json!({
                    "error": "internal_error",
                    "message": GENERIC_MESSAGE
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<Violations> for ApiError {
    fn from(v: Violations) -> Self {
        Self::Validation(v)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            _ => Self::Database(e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Insert(e) => Self::Insert(e),
            ServiceError::Db(e) => e.into(),
        }
    }
}
