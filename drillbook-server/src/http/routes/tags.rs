//! Category and sub-category endpoints
//!
//! One set of handlers, mounted once per [`TagKind`] under its endpoint:
//! `GET|POST {endpoint}`, `GET|PUT|DELETE {endpoint}/id/{id}`,
//! `GET {endpoint}/name/{name}`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::Tag;
use crate::http::error::ApiError;
use crate::http::extractors::{Valid, ValidPath, Validate};
use crate::http::server::AppState;
use crate::models::{TagDraft, TagKind, Violations};
use crate::service::TagService;
use super::list_or_no_content;

/// Create / update request
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Validate for TagRequest {
    type Valid = TagDraft;

    fn validate(self) -> Result<TagDraft, Violations> {
        TagDraft::parse(self.id, &self.name, &self.description)
    }
}

/// Tag response
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl<K> From<Tag<K>> for TagResponse {
    fn from(t: Tag<K>) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
        }
    }
}

/// GET {endpoint} - all tags, 204 when empty
async fn list<K: TagKind>(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let tags = TagService::<K>::new(&state.pool).find_all().await?;
    Ok(list_or_no_content(
        tags.into_iter().map(TagResponse::from).collect(),
    ))
}

/// POST {endpoint} - create, `Location: {endpoint}/{id}`
async fn create<K: TagKind>(
    State(state): State<Arc<AppState>>,
    Valid(draft): Valid<TagRequest>,
) -> Result<Response, ApiError> {
    let draft = TagDraft { id: None, ..draft };
    let tag = TagService::<K>::new(&state.pool).save(draft).await?;
    let location = format!("{}/{}", K::ENDPOINT, tag.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TagResponse::from(tag)),
    )
        .into_response())
}

/// GET {endpoint}/id/{id}
async fn find<K: TagKind>(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = TagService::<K>::new(&state.pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(K::RESOURCE, id))?;
    Ok(Json(TagResponse::from(tag)))
}

/// PUT {endpoint}/id/{id} - 400 on id mismatch, 404 when unknown
async fn update<K: TagKind>(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
    Valid(draft): Valid<TagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    if let Some(body_id) = draft.id.filter(|body_id| *body_id != id) {
        return Err(ApiError::id_mismatch(id, body_id));
    }

    let tag = TagService::<K>::new(&state.pool)
        .save(draft.with_id(id))
        .await?;
    Ok(Json(TagResponse::from(tag)))
}

/// DELETE {endpoint}/id/{id} - always 204
async fn remove<K: TagKind>(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<StatusCode, ApiError> {
    TagService::<K>::new(&state.pool).delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET {endpoint}/name/{name} - case-insensitive
async fn find_by_name<K: TagKind>(
    State(state): State<Arc<AppState>>,
    ValidPath(name): ValidPath<String>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = TagService::<K>::new(&state.pool)
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found(K::RESOURCE, &name))?;
    Ok(Json(TagResponse::from(tag)))
}

/// Tag routes for one kind
pub fn router<K: TagKind>() -> Router<Arc<AppState>> {
    let base = K::ENDPOINT;
    Router::new()
        .route(base, get(list::<K>).post(create::<K>))
        .route(
            &format!("{}/id/{{id}}", base),
            get(find::<K>).put(update::<K>).delete(remove::<K>),
        )
        .route(&format!("{}/name/{{name}}", base), get(find_by_name::<K>))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_validation() {
        let req: TagRequest = serde_json::from_str("{}").unwrap();
        let err = req.validate().unwrap_err();
        let paths: Vec<_> = err.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["name", "description"]);
    }

    #[test]
    fn response_shape() {
        let tag: Tag<crate::models::CategoryKind> = Tag::new(1, "Kicks", "Leg strikes");
        let json = serde_json::to_value(TagResponse::from(tag)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "Kicks", "description": "Leg strikes"})
        );
    }
}
