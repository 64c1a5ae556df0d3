//! Portfolio project request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use folio_core::models::content::Project;
use folio_core::store::ProjectStore;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiJson, ProjectRequest};

fn project_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("project {id} not found"))
}

/// `GET /api/projects/public`: visible projects by priority.
pub async fn list_public_projects_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(state.store.list_visible_projects().await?))
}

/// `GET /api/projects/public/{id}`: a single visible project.
pub async fn get_public_project_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    state
        .store
        .find_project(id)
        .await?
        .filter(|p| p.is_visible)
        .map(Json)
        .ok_or_else(|| project_not_found(id))
}

/// `GET /api/projects/{id}`: one of the caller's projects, hidden or not.
pub async fn get_my_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    state
        .store
        .find_project(id)
        .await?
        .filter(|p| p.user_id == user.0.id)
        .map(Json)
        .ok_or_else(|| project_not_found(id))
}

/// `GET /api/projects`: the caller's projects, hidden ones included.
pub async fn list_my_projects_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(state.store.list_projects_for_user(user.0.id).await?))
}

/// `POST /api/projects`
pub async fn create_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<ProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let draft = body.into_draft()?;
    let project = state.store.create_project(user.0.id, draft).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `PUT /api/projects/{id}`
pub async fn update_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ProjectRequest>,
) -> AppResult<Json<Project>> {
    let draft = body.into_draft()?;
    state
        .store
        .update_project(user.0.id, id, draft)
        .await?
        .map(Json)
        .ok_or_else(|| project_not_found(id))
}

/// `DELETE /api/projects/{id}`
pub async fn delete_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.store.delete_project(user.0.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(project_not_found(id))
    }
}
