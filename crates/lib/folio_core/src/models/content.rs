//! Blog and portfolio content models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default project category.
pub const DEFAULT_PROJECT_CATEGORY: &str = "other";

/// A blog post. `slug` is unique across all posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable post fields, used for both create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub published: bool,
}

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub is_visible: bool,
    pub category: String,
    pub priority: i32,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable project fields with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub is_visible: bool,
    pub category: String,
    pub priority: i32,
}

/// A skill shown on the portfolio. Level is a 0–100 proficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub category: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of skill fields for create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillDraft {
    pub name: String,
    pub level: i32,
    pub category: String,
    /// `None` keeps the current logo on update.
    pub logo: Option<String>,
}

/// Partial skill update used by batch edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl SkillPatch {
    /// Apply the patch on top of an existing skill.
    pub fn apply(&self, skill: &Skill) -> SkillDraft {
        SkillDraft {
            name: self.name.clone().unwrap_or_else(|| skill.name.clone()),
            level: self.level.unwrap_or(skill.level),
            category: self.category.clone().unwrap_or_else(|| skill.category.clone()),
            logo: self.logo.clone().or_else(|| skill.logo.clone()),
        }
    }
}

/// An entry in a user's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub links: Vec<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Data for a new activity entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub kind: String,
    pub description: String,
    pub links: Vec<String>,
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}
