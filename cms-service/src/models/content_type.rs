//! Content types: named categories that posts belong to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::{Patch, ValidationErrors};

/// A content type row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContentType {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Free-form description of the fields posts of this type carry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_fields: Option<Value>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /content-types`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContentType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub schema_fields: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl CreateContentType {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.require("slug", &self.slug, "Slug is required");
        errors.into_result()
    }
}

/// Body of `PUT /content-types/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub schema_fields: Patch<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl UpdateContentType {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_if_present("name", self.name.as_deref(), "Name cannot be empty");
        errors.require_if_present("slug", self.slug.as_deref(), "Slug cannot be empty");
        errors.into_result()
    }
}

/// List filters for content types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypeFilter {
    pub is_active: Option<bool>,
}
