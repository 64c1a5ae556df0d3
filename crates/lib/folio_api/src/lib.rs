//! # folio_api
//!
//! HTTP API library for Folio.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use folio_core::auth::AuthError;
use folio_core::auth::jwt::TokenService;
use folio_core::store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{activities, auth, health, posts, projects, skills, uploads};

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend.
    pub store: Arc<dyn Store>,
    /// Token issuer and validator built from the configured secret.
    pub tokens: Arc<TokenService>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl)?;
        Ok(Self {
            store,
            tokens: Arc::new(tokens),
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/admin/login", post(auth::admin_login_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/posts/public", get(posts::list_public_posts_handler))
        .route("/api/posts/public/{slug}", get(posts::get_public_post_handler))
        .route(
            "/api/projects/public",
            get(projects::list_public_projects_handler),
        )
        .route(
            "/api/projects/public/{id}",
            get(projects::get_public_project_handler),
        )
        .route("/api/skills/public", get(skills::list_skills_handler));

    let upload_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route(
            "/api/posts",
            get(posts::list_my_posts_handler).post(posts::create_post_handler),
        )
        .route(
            "/api/posts/{slug}",
            put(posts::update_post_handler).delete(posts::delete_post_handler),
        )
        .route(
            "/api/projects",
            get(projects::list_my_projects_handler).post(projects::create_project_handler),
        )
        .route(
            "/api/projects/{id}",
            get(projects::get_my_project_handler)
                .put(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        )
        .route(
            "/api/activities",
            get(activities::list_activities_handler).post(activities::create_activity_handler),
        )
        .route(
            "/api/uploads/images",
            post(uploads::upload_image_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Admin routes (require auth, then the admin flag)
    let admin = Router::new()
        .route(
            "/api/skills",
            get(skills::list_skills_handler).post(skills::create_skill_handler),
        )
        .route("/api/skills/batch", put(skills::batch_update_skills_handler))
        .route(
            "/api/skills/{id}",
            put(skills::update_skill_handler).delete(skills::delete_skill_handler),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
