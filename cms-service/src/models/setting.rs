//! Key/value site settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Patch, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Body of both `POST /settings` and `POST /settings/upsert`
///
/// An upsert replaces `value` and `description` wholesale, so omitted
/// fields are stored as null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSetting {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateSetting {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("key", &self.key, "Key is required");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSetting {
    #[serde(default)]
    pub value: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

/// Matches key or description, case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingFilter {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_required() {
        let body: CreateSetting = serde_json::from_value(json!({ "value": "x" })).unwrap();
        assert_eq!(body.validate().unwrap_err().fields()["key"], "Key is required");
    }

    #[test]
    fn test_null_value_is_omitted_from_output() {
        let setting = Setting {
            id: Uuid::nil(),
            key: "site_name".into(),
            value: None,
            description: None,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&setting).unwrap();
        assert!(json.get("value").is_none());
        assert_eq!(json["key"], "site_name");
    }
}
