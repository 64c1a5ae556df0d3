//! Request and response bodies.

use axum::extract::FromRequest;
use folio_core::models::auth::Identity;
use folio_core::models::content::{
    DEFAULT_PAGE_SIZE, DEFAULT_PROJECT_CATEGORY, MAX_PAGE_SIZE, NewActivity, Page, Post,
    PostDraft, ProjectDraft, SkillDraft, SkillPatch,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JSON extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "emailOrUsername", alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public view of an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<&Identity> for AuthUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            is_admin: identity.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: AuthUser,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Validate into a [`Page`]; `page >= 1`, `1 <= limit <= 100`.
    pub fn to_page(&self) -> Result<Page, AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".into()));
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Page { page, limit })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub items: Vec<Post>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl PostListResponse {
    pub fn new(items: Vec<Post>, total: i64, page: Page) -> Self {
        let limit = i64::from(page.limit.max(1));
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

impl PostRequest {
    pub fn into_draft(self) -> Result<PostDraft, AppError> {
        require_non_empty("title", &self.title)?;
        require_non_empty("content", &self.content)?;
        require_non_empty("excerpt", &self.excerpt)?;
        Ok(PostDraft {
            title: self.title.trim().to_string(),
            content: self.content,
            excerpt: self.excerpt,
            tags: self.tags,
            published: self.published,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub is_visible: Option<bool>,
    pub category: Option<String>,
    pub priority: Option<i32>,
}

impl ProjectRequest {
    pub fn into_draft(self) -> Result<ProjectDraft, AppError> {
        require_non_empty("title", &self.title)?;
        require_non_empty("description", &self.description)?;
        Ok(ProjectDraft {
            title: self.title.trim().to_string(),
            description: self.description,
            short_description: self.short_description,
            image_url: self.image_url,
            technologies: self.technologies,
            github_url: self.github_url,
            live_url: self.live_url,
            is_visible: self.is_visible.unwrap_or(true),
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROJECT_CATEGORY.to_string()),
            priority: self.priority.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequest {
    pub name: String,
    pub level: i32,
    pub category: String,
    pub logo: Option<String>,
}

impl SkillRequest {
    pub fn into_draft(self) -> Result<SkillDraft, AppError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("category", &self.category)?;
        check_level(self.level)?;
        Ok(SkillDraft {
            name: self.name.trim().to_string(),
            level: self.level,
            category: self.category.trim().to_string(),
            logo: self.logo.filter(|l| !l.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillBatchItem {
    pub id: i64,
    #[serde(flatten)]
    pub patch: SkillPatch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillBatchRequest {
    pub skills: Vec<SkillBatchItem>,
}

impl SkillBatchRequest {
    pub fn into_patches(self) -> Result<Vec<(i64, SkillPatch)>, AppError> {
        if self.skills.is_empty() {
            return Err(AppError::Validation("skills must not be empty".into()));
        }
        self.skills
            .into_iter()
            .map(|item| {
                let mut patch = item.patch;
                if let Some(level) = patch.level {
                    check_level(level)?;
                }
                if let Some(name) = &patch.name {
                    require_non_empty("name", name)?;
                }
                patch.logo = patch.logo.filter(|l| !l.trim().is_empty());
                Ok((item.id, patch))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl ActivityRequest {
    pub fn into_new(self) -> Result<NewActivity, AppError> {
        require_non_empty("type", &self.kind)?;
        require_non_empty("description", &self.description)?;
        Ok(NewActivity {
            kind: self.kind,
            description: self.description,
            links: self.links,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn check_level(level: i32) -> Result<(), AppError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        Err(AppError::Validation("level must be between 0 and 100".into()))
    }
}
