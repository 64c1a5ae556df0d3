//! Activity feed request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use folio_core::models::content::Activity;
use folio_core::store::ActivityStore;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ActivityRequest, ApiJson};

/// `GET /api/activities`: the caller's feed, newest first.
pub async fn list_activities_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Activity>>> {
    Ok(Json(state.store.list_activities_for_user(user.0.id).await?))
}

/// `POST /api/activities`
pub async fn create_activity_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<ActivityRequest>,
) -> AppResult<(StatusCode, Json<Activity>)> {
    let activity = state
        .store
        .create_activity(user.0.id, body.into_new()?)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}
