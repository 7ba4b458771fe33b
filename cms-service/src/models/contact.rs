//! Contact-form submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::{ContactStatus, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /contacts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl CreateContact {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.require("email", &self.email, "Email is required");
        errors.require("message", &self.message, "Message is required");
        errors.into_result()
    }
}

/// A submission together with the request metadata captured by the server
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub submission: CreateContact,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Body of `PUT /contacts/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContact {
    #[serde(default)]
    pub status: Option<ContactStatus>,
}

impl UpdateContact {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.status.is_none() {
            errors.add("status", "Status is required");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    /// Case-insensitive substring of the sender address
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_validation() {
        let body: CreateContact =
            serde_json::from_value(json!({ "name": "Jane", "email": "  " })).unwrap();
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.fields()["email"], "Email is required");
        assert_eq!(errors.fields()["message"], "Message is required");
        assert!(!errors.fields().contains_key("name"));
    }

    #[test]
    fn test_update_requires_status() {
        let empty: UpdateContact = serde_json::from_value(json!({})).unwrap();
        assert!(empty.validate().is_err());

        let read: UpdateContact = serde_json::from_value(json!({ "status": 2 })).unwrap();
        assert_eq!(read.status, Some(ContactStatus::Read));
        assert!(read.validate().is_ok());
    }
}
