//! Field-level validation results

use std::collections::BTreeMap;

/// Field name to message map collected while validating a request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `value` is blank
    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    /// Record `message` for `field` when a present value is blank
    pub fn require_if_present(&mut self, field: &str, value: Option<&str>, message: &str) {
        if let Some(value) = value {
            self.require(field, value, message);
        }
    }

    /// Whether no failures were recorded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The collected failures
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for BTreeMap<String, String> {
    fn from(errors: ValidationErrors) -> Self {
        errors.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_records_blank_fields() {
        let mut errors = ValidationErrors::new();
        errors.require("title", "  ", "Title is required");
        errors.require("slug", "hello", "Slug is required");
        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()["title"], "Title is required");
    }

    #[test]
    fn test_first_message_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Email is required");
        errors.add("email", "Email is invalid");
        assert_eq!(errors.fields()["email"], "Email is required");
    }

    #[test]
    fn test_require_if_present() {
        let mut errors = ValidationErrors::new();
        errors.require_if_present("name", None, "Name cannot be empty");
        assert!(errors.is_empty());
        errors.require_if_present("name", Some(""), "Name cannot be empty");
        assert!(errors.into_result().is_err());
    }
}
