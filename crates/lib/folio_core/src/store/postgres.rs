//! PostgreSQL-backed store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    ActivityStore, PostStore, ProjectStore, SkillStore, StoreError, StoreResult, UserStore,
};
use crate::models::auth::{Identity, NewIdentity};
use crate::models::content::{
    Activity, NewActivity, Page, Post, PostDraft, Project, ProjectDraft, Skill, SkillDraft,
    SkillPatch,
};

const USER_COLUMNS: &str = "id, email, name, password_hash, is_admin, created_at";

const POST_COLUMNS: &str = "id, title, slug, content, excerpt, tags, published, published_at, \
                            author_id, created_at, updated_at";

const PROJECT_COLUMNS: &str = "id, title, description, short_description, image_url, \
                               technologies, github_url, live_url, is_visible, category, \
                               priority, user_id, created_at, updated_at";

const SKILL_COLUMNS: &str = "id, name, level, category, logo, created_at, updated_at";

const ACTIVITY_COLUMNS: &str = "id, kind, description, links, user_id, created_at";

/// Store over a shared sqlx connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_users_by_name(&self, name: &str) -> StoreResult<Vec<Identity>> {
        // Two rows are enough to tell a unique name from an ambiguous one.
        let rows = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name = $1 ORDER BY id LIMIT 2"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_user(&self, new: NewIdentity) -> StoreResult<Identity> {
        if new.password_hash.is_empty() {
            return Err(StoreError::Invalid("password hash must not be empty".into()));
        }
        let row = sqlx::query_as::<_, Identity>(&format!(
            r#"
            INSERT INTO users (email, name, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.password_hash)
        .bind(new.is_admin)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_admin(&self, id: i64, is_admin: bool) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, Identity>(&format!(
            "UPDATE users SET is_admin = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn list_published_posts(&self, page: Page) -> StoreResult<(Vec<Post>, i64)> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE published = TRUE")
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE published = TRUE
            ORDER BY published_at DESC NULLS LAST, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn find_published_post(&self, slug: &str) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND published = TRUE"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_posts_by_author(&self, author_id: i64) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn post_slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create_post(&self, author_id: i64, slug: &str, draft: PostDraft) -> StoreResult<Post> {
        let row = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, slug, content, excerpt, tags, published, published_at, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN now() END, $7)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(slug)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(&draft.tags)
        .bind(draft.published)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_post(
        &self,
        author_id: i64,
        slug: &str,
        draft: PostDraft,
    ) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $3,
                content = $4,
                excerpt = $5,
                tags = $6,
                published = $7,
                published_at = CASE WHEN $7 THEN COALESCE(published_at, now()) END,
                updated_at = now()
            WHERE slug = $1 AND author_id = $2
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(slug)
        .bind(author_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(&draft.tags)
        .bind(draft.published)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_post(&self, author_id: i64, slug: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = $1 AND author_id = $2")
            .bind(slug)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_visible_projects(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE is_visible = TRUE \
             ORDER BY priority DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_projects_for_user(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = $1 \
             ORDER BY priority DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_project(&self, user_id: i64, draft: ProjectDraft) -> StoreResult<Project> {
        let row = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (title, description, short_description, image_url, technologies,
                                  github_url, live_url, is_visible, category, priority, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.short_description)
        .bind(&draft.image_url)
        .bind(&draft.technologies)
        .bind(&draft.github_url)
        .bind(&draft.live_url)
        .bind(draft.is_visible)
        .bind(&draft.category)
        .bind(draft.priority)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_project(
        &self,
        user_id: i64,
        id: i64,
        draft: ProjectDraft,
    ) -> StoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET title = $3,
                description = $4,
                short_description = $5,
                image_url = $6,
                technologies = $7,
                github_url = $8,
                live_url = $9,
                is_visible = $10,
                category = $11,
                priority = $12,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.short_description)
        .bind(&draft.image_url)
        .bind(&draft.technologies)
        .bind(&draft.github_url)
        .bind(&draft.live_url)
        .bind(draft.is_visible)
        .bind(&draft.category)
        .bind(draft.priority)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_project(&self, user_id: i64, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SkillStore for PgStore {
    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let rows = sqlx::query_as::<_, Skill>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY category, level DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_skill(&self, draft: SkillDraft) -> StoreResult<Skill> {
        let row = sqlx::query_as::<_, Skill>(&format!(
            r#"
            INSERT INTO skills (name, level, category, logo)
            VALUES ($1, $2, $3, $4)
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(draft.level)
        .bind(&draft.category)
        .bind(&draft.logo)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_skill(&self, id: i64, draft: SkillDraft) -> StoreResult<Option<Skill>> {
        let row = sqlx::query_as::<_, Skill>(&format!(
            r#"
            UPDATE skills
            SET name = $2, level = $3, category = $4, logo = COALESCE($5, logo), updated_at = now()
            WHERE id = $1
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(draft.level)
        .bind(&draft.category)
        .bind(&draft.logo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_skill(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn batch_update_skills(&self, patches: &[(i64, SkillPatch)]) -> StoreResult<Vec<Skill>> {
        let mut tx = self.pool.begin().await?;
        let mut updated = Vec::with_capacity(patches.len());

        for (id, patch) in patches {
            let current = sqlx::query_as::<_, Skill>(&format!(
                "SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1 FOR UPDATE"
            ))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("skill {id}")))?;

            let draft = patch.apply(&current);
            let row = sqlx::query_as::<_, Skill>(&format!(
                r#"
                UPDATE skills
                SET name = $2, level = $3, category = $4, logo = $5, updated_at = now()
                WHERE id = $1
                RETURNING {SKILL_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(&draft.name)
            .bind(draft.level)
            .bind(&draft.category)
            .bind(&draft.logo)
            .fetch_one(&mut *tx)
            .await?;
            updated.push(row);
        }

        tx.commit().await?;
        Ok(updated)
    }
}

#[async_trait]
impl ActivityStore for PgStore {
    async fn list_activities_for_user(&self, user_id: i64) -> StoreResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_activity(&self, user_id: i64, new: NewActivity) -> StoreResult<Activity> {
        let row = sqlx::query_as::<_, Activity>(&format!(
            r#"
            INSERT INTO activities (kind, description, links, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(&new.kind)
        .bind(&new.description)
        .bind(&new.links)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
