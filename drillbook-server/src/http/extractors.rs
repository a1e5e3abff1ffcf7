//! Custom Axum extractors
//!
//! Both map framework rejections onto [`ApiError`] so every 400 carries
//! the `{error, message}` body.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::models::Violations;
use super::error::ApiError;

/// A request body that validates into a domain value.
pub trait Validate: DeserializeOwned {
    type Valid;

    fn validate(self) -> Result<Self::Valid, Violations>;
}

/// Extract a JSON body and validate it before the handler runs
pub struct Valid<T: Validate>(pub T::Valid);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;

        Ok(Self(body.validate()?))
    }
}

/// Extract path parameters, rejecting unparsable segments with 400
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;

        Ok(Self(value))
    }
}
