//! Skill request handlers. Writes are admin-only (enforced by the router).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use folio_core::models::content::Skill;
use folio_core::store::SkillStore;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ApiJson, SkillBatchRequest, SkillRequest};

fn skill_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("skill {id} not found"))
}

/// `GET /api/skills/public` and `GET /api/skills`
pub async fn list_skills_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Skill>>> {
    Ok(Json(state.store.list_skills().await?))
}

/// `POST /api/skills`
pub async fn create_skill_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SkillRequest>,
) -> AppResult<(StatusCode, Json<Skill>)> {
    let skill = state.store.create_skill(body.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// `PUT /api/skills/{id}`: an absent or empty logo keeps the current one.
pub async fn update_skill_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<SkillRequest>,
) -> AppResult<Json<Skill>> {
    state
        .store
        .update_skill(id, body.into_draft()?)
        .await?
        .map(Json)
        .ok_or_else(|| skill_not_found(id))
}

/// `DELETE /api/skills/{id}`
pub async fn delete_skill_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.store.delete_skill(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(skill_not_found(id))
    }
}

/// `PUT /api/skills/batch`: all patches apply or none do.
pub async fn batch_update_skills_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SkillBatchRequest>,
) -> AppResult<Json<Vec<Skill>>> {
    let patches = body.into_patches()?;
    Ok(Json(state.store.batch_update_skills(&patches).await?))
}
