//! Tags attached to posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl CreateTag {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.require("slug", &self.slug, "Slug is required");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTag {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl UpdateTag {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_if_present("name", self.name.as_deref(), "Name cannot be empty");
        errors.require_if_present("slug", self.slug.as_deref(), "Slug cannot be empty");
        errors.into_result()
    }
}

/// Matches name or slug, case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub search: Option<String>,
}
