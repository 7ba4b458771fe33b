//! Content posts in their stored, detailed and summary forms

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::{Author, ContentType, Patch, PostMedia, PostStatus, Tag, ValidationErrors};

/// Columns of `content_posts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post with its content type, author, tags and media
///
/// Returned by every single-post read and write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub content_type: ContentType,
    pub author: Author,
    pub tags: Vec<Tag>,
    pub media: Vec<PostMedia>,
}

/// A list row: the post plus display names from its joins
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PostSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub post: Post,
    pub content_type_name: String,
    pub content_type_slug: String,
    pub author_name: String,
}

/// Body of `POST /posts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePost {
    #[serde(default)]
    pub content_type_id: Uuid,
    #[serde(default)]
    pub author_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl CreatePost {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("slug", &self.slug, "Slug is required");
        if self.content_type_id.is_nil() {
            errors.add("content_type_id", "Content type ID is required");
        }
        if self.author_id.is_nil() {
            errors.add("author_id", "Author ID is required");
        }
        errors.into_result()
    }
}

/// Body of `PUT /posts/{id}`
///
/// `tag_ids`: absent keeps the current tags, any array (even empty)
/// replaces them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePost {
    #[serde(default)]
    pub content_type_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Patch<String>,
    #[serde(default)]
    pub content: Patch<String>,
    #[serde(default)]
    pub metadata: Patch<Value>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub published_at: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub tag_ids: Option<Vec<Uuid>>,
}

impl UpdatePost {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_if_present("title", self.title.as_deref(), "Title cannot be empty");
        errors.require_if_present("slug", self.slug.as_deref(), "Slug cannot be empty");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub content_type_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub status: Option<PostStatus>,
    /// Matches title or excerpt, case-insensitively
    pub search: Option<String>,
}
