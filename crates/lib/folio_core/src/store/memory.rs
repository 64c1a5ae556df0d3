//! In-memory store for tests and database-less local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    ActivityStore, PostStore, ProjectStore, SkillStore, StoreError, StoreResult, UserStore,
};
use crate::models::auth::{Identity, NewIdentity};
use crate::models::content::{
    Activity, NewActivity, Page, Post, PostDraft, Project, ProjectDraft, Skill, SkillDraft,
    SkillPatch,
};

/// Rows keyed by an autoincrement id starting at 1.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<Identity>,
    posts: Table<Post>,
    projects: Table<Project>,
    skills: Table<Skill>,
    activities: Table<Activity>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<Identity>> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_users_by_name(&self, name: &str) -> StoreResult<Vec<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .filter(|u| u.name == name)
            .take(2)
            .cloned()
            .collect())
    }

    async fn create_user(&self, new: NewIdentity) -> StoreResult<Identity> {
        if new.password_hash.is_empty() {
            return Err(StoreError::Invalid("password hash must not be empty".into()));
        }
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict(format!("email {} is taken", new.email)));
        }
        let id = tables.users.allocate();
        let identity = Identity {
            id,
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            is_admin: new.is_admin,
            created_at: Utc::now(),
        };
        tables.users.rows.insert(id, identity.clone());
        Ok(identity)
    }

    async fn set_admin(&self, id: i64, is_admin: bool) -> StoreResult<Option<Identity>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.rows.get_mut(&id).map(|u| {
            u.is_admin = is_admin;
            u.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.rows.remove(&id).is_some();
        if removed {
            tables.posts.rows.retain(|_, p| p.author_id != id);
            tables.projects.rows.retain(|_, p| p.user_id != id);
            tables.activities.rows.retain(|_, a| a.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list_published_posts(&self, page: Page) -> StoreResult<(Vec<Post>, i64)> {
        let tables = self.tables.read().await;
        let mut published: Vec<&Post> = tables.posts.rows.values().filter(|p| p.published).collect();
        published.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = published.len() as i64;
        let rows = published
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }

    async fn find_published_post(&self, slug: &str) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .rows
            .values()
            .find(|p| p.slug == slug && p.published)
            .cloned())
    }

    async fn list_posts_by_author(&self, author_id: i64) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .rows
            .values()
            .rev()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn post_slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.posts.rows.values().any(|p| p.slug == slug))
    }

    async fn create_post(&self, author_id: i64, slug: &str, draft: PostDraft) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        if tables.posts.rows.values().any(|p| p.slug == slug) {
            return Err(StoreError::Conflict(format!("slug {slug} is taken")));
        }
        let id = tables.posts.allocate();
        let now = Utc::now();
        let post = Post {
            id,
            title: draft.title,
            slug: slug.to_string(),
            content: draft.content,
            excerpt: draft.excerpt,
            tags: draft.tags,
            published: draft.published,
            published_at: draft.published.then_some(now),
            author_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.rows.insert(id, post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        author_id: i64,
        slug: &str,
        draft: PostDraft,
    ) -> StoreResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables
            .posts
            .rows
            .values_mut()
            .find(|p| p.slug == slug && p.author_id == author_id)
        else {
            return Ok(None);
        };
        let now = Utc::now();
        post.title = draft.title;
        post.content = draft.content;
        post.excerpt = draft.excerpt;
        post.tags = draft.tags;
        post.published = draft.published;
        post.published_at = if draft.published {
            post.published_at.or(Some(now))
        } else {
            None
        };
        post.updated_at = now;
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, author_id: i64, slug: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let id = tables
            .posts
            .rows
            .values()
            .find(|p| p.slug == slug && p.author_id == author_id)
            .map(|p| p.id);
        Ok(id.and_then(|id| tables.posts.rows.remove(&id)).is_some())
    }
}

fn by_priority(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_visible_projects(&self) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Project> = tables
            .projects
            .rows
            .values()
            .filter(|p| p.is_visible)
            .cloned()
            .collect();
        by_priority(&mut rows);
        Ok(rows)
    }

    async fn list_projects_for_user(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Project> = tables
            .projects
            .rows
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        by_priority(&mut rows);
        Ok(rows)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.rows.get(&id).cloned())
    }

    async fn create_project(&self, user_id: i64, draft: ProjectDraft) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let id = tables.projects.allocate();
        let now = Utc::now();
        let project = Project {
            id,
            title: draft.title,
            description: draft.description,
            short_description: draft.short_description,
            image_url: draft.image_url,
            technologies: draft.technologies,
            github_url: draft.github_url,
            live_url: draft.live_url,
            is_visible: draft.is_visible,
            category: draft.category,
            priority: draft.priority,
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.rows.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        user_id: i64,
        id: i64,
        draft: ProjectDraft,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables
            .projects
            .rows
            .get_mut(&id)
            .filter(|p| p.user_id == user_id)
        else {
            return Ok(None);
        };
        project.title = draft.title;
        project.description = draft.description;
        project.short_description = draft.short_description;
        project.image_url = draft.image_url;
        project.technologies = draft.technologies;
        project.github_url = draft.github_url;
        project.live_url = draft.live_url;
        project.is_visible = draft.is_visible;
        project.category = draft.category;
        project.priority = draft.priority;
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, user_id: i64, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .projects
            .rows
            .get(&id)
            .is_some_and(|p| p.user_id == user_id);
        Ok(owned && tables.projects.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl SkillStore for MemoryStore {
    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Skill> = tables.skills.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| b.level.cmp(&a.level))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn create_skill(&self, draft: SkillDraft) -> StoreResult<Skill> {
        let mut tables = self.tables.write().await;
        let id = tables.skills.allocate();
        let now = Utc::now();
        let skill = Skill {
            id,
            name: draft.name,
            level: draft.level,
            category: draft.category,
            logo: draft.logo,
            created_at: now,
            updated_at: now,
        };
        tables.skills.rows.insert(id, skill.clone());
        Ok(skill)
    }

    async fn update_skill(&self, id: i64, draft: SkillDraft) -> StoreResult<Option<Skill>> {
        let mut tables = self.tables.write().await;
        Ok(tables.skills.rows.get_mut(&id).map(|skill| {
            skill.name = draft.name;
            skill.level = draft.level;
            skill.category = draft.category;
            if draft.logo.is_some() {
                skill.logo = draft.logo;
            }
            skill.updated_at = Utc::now();
            skill.clone()
        }))
    }

    async fn delete_skill(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.skills.rows.remove(&id).is_some())
    }

    async fn batch_update_skills(&self, patches: &[(i64, SkillPatch)]) -> StoreResult<Vec<Skill>> {
        let mut tables = self.tables.write().await;

        // Check every id before touching any row.
        if let Some((id, _)) = patches
            .iter()
            .find(|(id, _)| !tables.skills.rows.contains_key(id))
        {
            return Err(StoreError::NotFound(format!("skill {id}")));
        }

        // Patches apply in order, so a repeated id sees the earlier change.
        let now = Utc::now();
        let mut updated = Vec::with_capacity(patches.len());
        for (id, patch) in patches {
            if let Some(skill) = tables.skills.rows.get_mut(id) {
                let draft = patch.apply(skill);
                skill.name = draft.name;
                skill.level = draft.level;
                skill.category = draft.category;
                skill.logo = draft.logo;
                skill.updated_at = now;
                updated.push(skill.clone());
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn list_activities_for_user(&self, user_id: i64) -> StoreResult<Vec<Activity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .activities
            .rows
            .values()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_activity(&self, user_id: i64, new: NewActivity) -> StoreResult<Activity> {
        let mut tables = self.tables.write().await;
        let id = tables.activities.allocate();
        let activity = Activity {
            id,
            kind: new.kind,
            description: new.description,
            links: new.links,
            user_id,
            created_at: Utc::now(),
        };
        tables.activities.rows.insert(id, activity.clone());
        Ok(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewIdentity {
        NewIdentity {
            email: email.into(),
            name: "alice".into(),
            password_hash: "$2b$10$hash".into(),
            is_admin: false,
        }
    }

    fn draft(title: &str, published: bool) -> PostDraft {
        PostDraft {
            title: title.into(),
            content: "body".into(),
            excerpt: "short".into(),
            tags: vec!["rust".into()],
            published,
        }
    }

    fn skill(name: &str, level: i32) -> SkillDraft {
        SkillDraft {
            name: name.into(),
            level,
            category: "language".into(),
            logo: None,
        }
    }

    #[tokio::test]
    async fn user_ids_autoincrement_from_one() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("a@x.com")).await.unwrap();
        let b = store.create_user(new_user("b@x.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@x.com")).await.unwrap();
        let err = store.create_user(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_hash_is_rejected() {
        let store = MemoryStore::new();
        let mut user = new_user("a@x.com");
        user.password_hash.clear();
        let err = store.create_user(user).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn post_updates_are_owner_scoped() {
        let store = MemoryStore::new();
        store.create_post(2, "hello", draft("Hello", false)).await.unwrap();
        assert!(
            store
                .update_post(1, "hello", draft("Hijacked", false))
                .await
                .unwrap()
                .is_none()
        );
        assert!(!store.delete_post(1, "hello").await.unwrap());
        assert!(store.delete_post(2, "hello").await.unwrap());
    }

    #[tokio::test]
    async fn publishing_sets_published_at_once() {
        let store = MemoryStore::new();
        let post = store.create_post(1, "a", draft("A", false)).await.unwrap();
        assert!(post.published_at.is_none());

        let published = store
            .update_post(1, "a", draft("A", true))
            .await
            .unwrap()
            .unwrap();
        let first = published.published_at.unwrap();

        let again = store
            .update_post(1, "a", draft("A v2", true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.published_at, Some(first));
    }

    #[tokio::test]
    async fn public_listing_hides_drafts_and_pages() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .create_post(1, &format!("p{i}"), draft("P", true))
                .await
                .unwrap();
        }
        store.create_post(1, "draft", draft("D", false)).await.unwrap();

        let (rows, total) = store
            .list_published_posts(Page { page: 1, limit: 2 })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].slug, "p2");

        let (rows, _) = store
            .list_published_posts(Page { page: 2, limit: 2 })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.find_published_post("draft").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_update_is_all_or_nothing() {
        let store = MemoryStore::new();
        let rust = store.create_skill(skill("Rust", 70)).await.unwrap();

        let patches = vec![
            (
                rust.id,
                SkillPatch {
                    level: Some(90),
                    ..SkillPatch::default()
                },
            ),
            (99, SkillPatch::default()),
        ];
        let err = store.batch_update_skills(&patches).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let skills = store.list_skills().await.unwrap();
        assert_eq!(skills[0].level, 70);
    }

    #[tokio::test]
    async fn repeated_id_in_batch_applies_patches_in_order() {
        let store = MemoryStore::new();
        let rust = store.create_skill(skill("Rust", 70)).await.unwrap();

        let patches = vec![
            (
                rust.id,
                SkillPatch {
                    level: Some(90),
                    ..SkillPatch::default()
                },
            ),
            (
                rust.id,
                SkillPatch {
                    name: Some("Rustlang".into()),
                    ..SkillPatch::default()
                },
            ),
        ];
        let updated = store.batch_update_skills(&patches).await.unwrap();
        let last = updated.last().unwrap();
        assert_eq!((last.name.as_str(), last.level), ("Rustlang", 90));

        let stored = &store.list_skills().await.unwrap()[0];
        assert_eq!((stored.name.as_str(), stored.level), ("Rustlang", 90));
    }

    #[tokio::test]
    async fn skill_update_without_logo_keeps_existing() {
        let store = MemoryStore::new();
        let mut with_logo = skill("Rust", 70);
        with_logo.logo = Some("rust.svg".into());
        let created = store.create_skill(with_logo).await.unwrap();

        let updated = store
            .update_skill(created.id, skill("Rust", 80))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.logo.as_deref(), Some("rust.svg"));
        assert_eq!(updated.level, 80);
    }

    #[tokio::test]
    async fn visible_projects_sort_by_priority() {
        let store = MemoryStore::new();
        for (title, priority, visible) in [("low", 0, true), ("high", 5, true), ("hidden", 9, false)] {
            store
                .create_project(
                    1,
                    ProjectDraft {
                        title: title.into(),
                        description: "d".into(),
                        short_description: String::new(),
                        image_url: None,
                        technologies: vec![],
                        github_url: None,
                        live_url: None,
                        is_visible: visible,
                        category: "other".into(),
                        priority,
                    },
                )
                .await
                .unwrap();
        }
        let titles: Vec<String> = store
            .list_visible_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["high", "low"]);
    }
}
