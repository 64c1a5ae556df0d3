//! Persistence seams.
//!
//! Every table is reached through one of the traits below. [`postgres::PgStore`]
//! is the production implementation; [`memory::MemoryStore`] backs tests and
//! local runs without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::auth::{Identity, NewIdentity};
use crate::models::content::{
    Activity, NewActivity, Page, Post, PostDraft, Project, ProjectDraft, Skill, SkillDraft,
    SkillPatch,
};

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid record: {0}")]
    Invalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e
            && db.code().as_deref() == Some(UNIQUE_VIOLATION)
        {
            return Self::Conflict(db.message().to_string());
        }
        Self::Db(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<Identity>>;

    /// Exact, case-sensitive match.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    async fn find_users_by_name(&self, name: &str) -> StoreResult<Vec<Identity>>;

    /// Rejects an empty hash with [`StoreError::Invalid`] and a taken email
    /// with [`StoreError::Conflict`].
    async fn create_user(&self, new: NewIdentity) -> StoreResult<Identity>;

    async fn set_admin(&self, id: i64, is_admin: bool) -> StoreResult<Option<Identity>>;

    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Published posts, newest publication first, plus the total count.
    async fn list_published_posts(&self, page: Page) -> StoreResult<(Vec<Post>, i64)>;

    async fn find_published_post(&self, slug: &str) -> StoreResult<Option<Post>>;

    async fn list_posts_by_author(&self, author_id: i64) -> StoreResult<Vec<Post>>;

    async fn post_slug_exists(&self, slug: &str) -> StoreResult<bool>;

    async fn create_post(&self, author_id: i64, slug: &str, draft: PostDraft) -> StoreResult<Post>;

    /// `None` when the slug does not exist or belongs to another author.
    async fn update_post(
        &self,
        author_id: i64,
        slug: &str,
        draft: PostDraft,
    ) -> StoreResult<Option<Post>>;

    async fn delete_post(&self, author_id: i64, slug: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Visible projects ordered by priority, highest first.
    async fn list_visible_projects(&self) -> StoreResult<Vec<Project>>;

    async fn list_projects_for_user(&self, user_id: i64) -> StoreResult<Vec<Project>>;

    /// Any project by id, regardless of owner or visibility.
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;

    async fn create_project(&self, user_id: i64, draft: ProjectDraft) -> StoreResult<Project>;

    async fn update_project(
        &self,
        user_id: i64,
        id: i64,
        draft: ProjectDraft,
    ) -> StoreResult<Option<Project>>;

    async fn delete_project(&self, user_id: i64, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait SkillStore: Send + Sync {
    /// Skills grouped by category, then by level descending.
    async fn list_skills(&self) -> StoreResult<Vec<Skill>>;

    async fn create_skill(&self, draft: SkillDraft) -> StoreResult<Skill>;

    async fn update_skill(&self, id: i64, draft: SkillDraft) -> StoreResult<Option<Skill>>;

    async fn delete_skill(&self, id: i64) -> StoreResult<bool>;

    /// Apply every patch or none. A missing id fails the whole batch with
    /// [`StoreError::NotFound`].
    async fn batch_update_skills(&self, patches: &[(i64, SkillPatch)]) -> StoreResult<Vec<Skill>>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Newest first.
    async fn list_activities_for_user(&self, user_id: i64) -> StoreResult<Vec<Activity>>;

    async fn create_activity(&self, user_id: i64, new: NewActivity) -> StoreResult<Activity>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store:
    UserStore + PostStore + ProjectStore + SkillStore + ActivityStore
{
}

impl<T> Store for T where
    T: UserStore + PostStore + ProjectStore + SkillStore + ActivityStore
{
}
