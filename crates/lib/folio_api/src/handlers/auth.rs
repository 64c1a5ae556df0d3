//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiJson, AuthUser, LoginRequest, RegisterRequest, TokenResponse};
use crate::services::auth;

/// `POST /api/auth/login`: authenticate with email (or name) + password.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(
        state.store.as_ref(),
        &state.tokens,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/auth/admin/login`: login restricted to administrators.
pub async fn admin_login_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::admin_login(
        state.store.as_ref(),
        &state.tokens,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/auth/register`: create a new account.
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let resp = auth::register(
        state.store.as_ref(),
        &state.tokens,
        &body.name,
        &body.email,
        &body.password,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `GET /api/auth/me`: the caller's account.
pub async fn me_handler(
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> Json<AuthUser> {
    Json(AuthUser::from(&user.0))
}
