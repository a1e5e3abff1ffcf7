//! Drill endpoints
//!
//! Drills are created from a name, then updated with the full payload
//! (links and the whole instruction list). Instructions are read-only
//! outside of that update.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::{Valid, ValidPath, Validate};
use crate::http::server::AppState;
use crate::models::{
    CategoryKind, Drill, EntityName, Instruction, SubCategoryKind, TagKind, Violations,
};
use crate::service::{DrillService, TagService};
use super::list_or_no_content;
use super::tags::TagResponse;

/// POST /drill body - name only
#[derive(Debug, Deserialize)]
pub struct DrillCreateRequest {
    #[serde(default)]
    pub name: String,
}

impl Validate for DrillCreateRequest {
    type Valid = Drill;

    fn validate(self) -> Result<Drill, Violations> {
        Ok(Drill::new(EntityName::new(&self.name)?))
    }
}

/// One instruction of an update payload
#[derive(Debug, Deserialize)]
pub struct InstructionRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

/// PUT /drill/id/{id} body - replaces links and instructions
#[derive(Debug, Deserialize)]
pub struct DrillUpdateRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub sub_categories: Vec<i64>,
    #[serde(default)]
    pub related_drills: Vec<i64>,
    #[serde(default)]
    pub instructions: Vec<InstructionRequest>,
}

impl Validate for DrillUpdateRequest {
    type Valid = Drill;

    /// Instructions are numbered from 1 in submitted order.
    fn validate(self) -> Result<Drill, Violations> {
        let mut v = Violations::new();
        let name = v.check(EntityName::new(&self.name));

        let mut instructions = Vec::with_capacity(self.instructions.len());
        for (i, req) in self.instructions.iter().enumerate() {
            let number = i as i32 + 1;
            match Instruction::parse(number, &req.description, req.steps.as_slice(), req.video_id.as_deref()) {
                Ok(ins) => instructions.push(ins),
                Err(inner) => v.nested("instructions", i, inner),
            }
        }

        let mut related = Vec::with_capacity(self.related_drills.len());
        for id in self.related_drills {
            if !related.contains(&id) {
                related.push(id);
            }
        }

        match name {
            Some(name) if v.is_empty() => {
                let mut drill = Drill::new(name);
                drill.id = self.id;
                drill.categories = self.categories.into_iter().collect();
                drill.sub_categories = self.sub_categories.into_iter().collect();
                drill.related_drills = related;
                drill.instructions = instructions;
                Ok(drill)
            }
            _ => Err(v),
        }
    }
}

/// Instruction as returned by the API
#[derive(Debug, Serialize)]
pub struct InstructionResponse {
    pub description: String,
    pub steps: Vec<String>,
    pub video_id: Option<String>,
}

impl From<Instruction> for InstructionResponse {
    fn from(i: Instruction) -> Self {
        Self {
            description: i.description,
            steps: i.steps,
            video_id: i.video_id,
        }
    }
}

/// Drill response
#[derive(Debug, Serialize)]
pub struct DrillResponse {
    pub id: Option<i64>,
    pub name: String,
    pub categories: Vec<i64>,
    pub sub_categories: Vec<i64>,
    pub related_drills: Vec<i64>,
    pub instructions: Vec<InstructionResponse>,
}

impl From<Drill> for DrillResponse {
    fn from(d: Drill) -> Self {
        Self {
            id: d.id,
            name: d.name,
            categories: d.categories.into_iter().collect(),
            sub_categories: d.sub_categories.into_iter().collect(),
            related_drills: d.related_drills,
            instructions: d.instructions.into_iter().map(InstructionResponse::from).collect(),
        }
    }
}

async fn load(state: &AppState, id: i64) -> Result<Drill, ApiError> {
    DrillService::new(&state.pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("drill", id))
}

/// GET /drill - all drills, 204 when empty
async fn list_drills(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let drills = DrillService::new(&state.pool).find_all().await?;
    Ok(list_or_no_content(
        drills.into_iter().map(DrillResponse::from).collect(),
    ))
}

/// POST /drill - create from a name
async fn create_drill(
    State(state): State<Arc<AppState>>,
    Valid(drill): Valid<DrillCreateRequest>,
) -> Result<Response, ApiError> {
    let saved = DrillService::new(&state.pool).save(drill).await?;
    let location = format!("/drill/{}", saved.id.unwrap_or_default());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(DrillResponse::from(saved)),
    )
        .into_response())
}

/// GET /drill/id/{id}
async fn get_drill(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<DrillResponse>, ApiError> {
    Ok(Json(DrillResponse::from(load(&state, id).await?)))
}

/// PUT /drill/id/{id} - full replacement; 400 on id mismatch, 404 when unknown
async fn update_drill(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
    Valid(mut drill): Valid<DrillUpdateRequest>,
) -> Result<Json<DrillResponse>, ApiError> {
    if let Some(body_id) = drill.id.filter(|body_id| *body_id != id) {
        return Err(ApiError::id_mismatch(id, body_id));
    }
    drill.id = Some(id);

    let saved = DrillService::new(&state.pool).save(drill).await?;
    Ok(Json(DrillResponse::from(saved)))
}

/// DELETE /drill/id/{id} - always 204
async fn delete_drill(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<StatusCode, ApiError> {
    DrillService::new(&state.pool).delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /drill/name/{name} - case-insensitive
async fn get_drill_by_name(
    State(state): State<Arc<AppState>>,
    ValidPath(name): ValidPath<String>,
) -> Result<Json<DrillResponse>, ApiError> {
    let drill = DrillService::new(&state.pool)
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("drill", &name))?;
    Ok(Json(DrillResponse::from(drill)))
}

/// GET /drill/id/{id}/how-to - instruction descriptions in order
async fn how_to(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Response, ApiError> {
    let drill = load(&state, id).await?;
    Ok(list_or_no_content(
        drill
            .instructions
            .into_iter()
            .map(|i| i.description)
            .collect(),
    ))
}

/// GET /drill/id/{id}/how-to/{number}
async fn how_to_step(
    State(state): State<Arc<AppState>>,
    ValidPath((id, number)): ValidPath<(i64, i32)>,
) -> Result<Json<InstructionResponse>, ApiError> {
    let drill = load(&state, id).await?;
    let instruction = drill
        .instruction(number)
        .cloned()
        .ok_or_else(|| ApiError::not_found("instruction", format!("{}/{}", id, number)))?;
    Ok(Json(InstructionResponse::from(instruction)))
}

/// Linked tags of one kind, resolved through `find_all_by_ids`.
async fn linked_tags<K: TagKind>(state: &AppState, ids: Vec<i64>) -> Result<Response, ApiError> {
    let tags = TagService::<K>::new(&state.pool).find_all_by_ids(&ids).await?;
    Ok(list_or_no_content(
        tags.into_iter().map(TagResponse::from).collect(),
    ))
}

/// GET /drill/id/{id}/categories
async fn drill_categories(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Response, ApiError> {
    let drill = load(&state, id).await?;
    linked_tags::<CategoryKind>(&state, drill.categories.into_iter().collect()).await
}

/// GET /drill/id/{id}/sub_categories
async fn drill_sub_categories(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Response, ApiError> {
    let drill = load(&state, id).await?;
    linked_tags::<SubCategoryKind>(&state, drill.sub_categories.into_iter().collect()).await
}

/// Drill routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drill", get(list_drills).post(create_drill))
        .route(
            "/drill/id/{id}",
            get(get_drill).put(update_drill).delete(delete_drill),
        )
        .route("/drill/name/{name}", get(get_drill_by_name))
        .route("/drill/id/{id}/how-to", get(how_to))
        .route("/drill/id/{id}/how-to/{number}", get(how_to_step))
        .route("/drill/id/{id}/categories", get(drill_categories))
        .route("/drill/id/{id}/sub_categories", get(drill_sub_categories))
}
