//! Blog post request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use folio_core::models::content::Post;
use folio_core::store::PostStore;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiJson, ListQuery, PostListResponse, PostRequest};
use crate::services::posts;

fn post_not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("post '{slug}' not found"))
}

/// `GET /api/posts/public`: published posts, newest first.
pub async fn list_public_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PostListResponse>> {
    let page = query.to_page()?;
    let (items, total) = state.store.list_published_posts(page).await?;
    Ok(Json(PostListResponse::new(items, total, page)))
}

/// `GET /api/posts/public/{slug}`: a single published post.
pub async fn get_public_post_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Post>> {
    state
        .store
        .find_published_post(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| post_not_found(&slug))
}

/// `GET /api/posts`: the caller's posts, drafts included.
pub async fn list_my_posts_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.store.list_posts_by_author(user.0.id).await?))
}

/// `POST /api/posts`: create a post.
pub async fn create_post_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<PostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let draft = body.into_draft()?;
    let post = posts::create_post(state.store.as_ref(), user.0.id, draft).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `PUT /api/posts/{slug}`: replace a post's editable fields. Slug is kept.
pub async fn update_post_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<PostRequest>,
) -> AppResult<Json<Post>> {
    let draft = body.into_draft()?;
    state
        .store
        .update_post(user.0.id, &slug, draft)
        .await?
        .map(Json)
        .ok_or_else(|| post_not_found(&slug))
}

/// `DELETE /api/posts/{slug}`
pub async fn delete_post_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    if state.store.delete_post(user.0.id, &slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(post_not_found(&slug))
    }
}
