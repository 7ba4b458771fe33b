//! Media metadata and post attachments
//!
//! Only metadata lives here; the bytes are stored elsewhere under
//! `bucket_name/object_key`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::enums::deserialize_lenient;
use super::{FileType, MediaRole, Patch, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Media {
    pub id: Uuid,
    pub file_name: String,
    pub object_key: String,
    pub bucket_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
    pub file_type: FileType,
    pub mime_type: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMedia {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub object_key: String,
    #[serde(default)]
    pub bucket_name: String,
    #[serde(default)]
    pub cdn_url: Option<String>,
    /// `None` when absent or not a known code; rejected by [`CreateMedia::validate`]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub file_type: Option<FileType>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub dimensions: Option<Value>,
    #[serde(default)]
    pub variants: Option<Value>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

impl CreateMedia {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("file_name", &self.file_name, "File name is required");
        errors.require("object_key", &self.object_key, "Object key is required");
        errors.require("bucket_name", &self.bucket_name, "Bucket name is required");
        errors.require("mime_type", &self.mime_type, "MIME type is required");
        if self.file_size <= 0 {
            errors.add("file_size", "File size must be positive");
        }
        if self.file_type.is_none() {
            errors.add(
                "file_type",
                "File type must be 1 (image), 2 (video), or 3 (document)",
            );
        }
        errors.into_result()
    }
}

/// Only descriptive fields are mutable; the storage location is fixed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMedia {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub cdn_url: Patch<String>,
    #[serde(default)]
    pub dimensions: Patch<Value>,
    #[serde(default)]
    pub variants: Patch<Value>,
    #[serde(default)]
    pub alt_text: Patch<String>,
}

impl UpdateMedia {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_if_present(
            "file_name",
            self.file_name.as_deref(),
            "File name cannot be empty",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilter {
    pub file_type: Option<FileType>,
    /// Matches file name or alt text, case-insensitively
    pub search: Option<String>,
}

/// Association between a post and a media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMedia {
    pub id: Uuid,
    pub post_id: Uuid,
    pub media_id: Uuid,
    pub media_role: MediaRole,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
}

/// Body of `POST /posts/{id}/media`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachMedia {
    #[serde(default)]
    pub media_id: Uuid,
    #[serde(default)]
    pub media_role: MediaRole,
    #[serde(default)]
    pub display_order: i32,
}

impl AttachMedia {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.media_id.is_nil() {
            errors.add("media_id", "Media ID is required");
        }
        errors.into_result()
    }
}
