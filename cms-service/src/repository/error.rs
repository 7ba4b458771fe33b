//! Repository error types
//!
//! Every repository operation reports failures through [`RepositoryError`], whose
//! [`RepositoryErrorKind`] is one of four categories. Storage-library errors are
//! classified once, here, so callers never inspect `sqlx` types.
//!
//! # Example
//!
//! ```rust
//! use cms_service::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Tag", "news");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.entity_id.as_deref(), Some("news"));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Loading a single entity by its identifier
    FindById,
    /// Loading a single entity by slug or key
    FindBySlug,
    /// Listing a page of entities
    List,
    /// Counting entities
    Count,
    /// Creating a new entity
    Create,
    /// Partially updating an entity
    Update,
    /// Deleting an entity
    Delete,
    /// Insert-or-replace by natural key
    Upsert,
    /// Loading several entities by key in one round-trip
    BulkGet,
    /// Creating a post/media association
    AttachMedia,
    /// Removing a post/media association
    DetachMedia,
    /// Bumping a post's view counter
    IncrementViewCount,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::FindBySlug => write!(f, "find_by_slug"),
            Self::List => write!(f, "list"),
            Self::Count => write!(f, "count"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Upsert => write!(f, "upsert"),
            Self::BulkGet => write!(f, "bulk_get"),
            Self::AttachMedia => write!(f, "attach_media"),
            Self::DetachMedia => write!(f, "detach_media"),
            Self::IncrementViewCount => write!(f, "increment_view_count"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// No row matched the identifier
    NotFound,
    /// A unique constraint rejected the write
    Duplicate,
    /// A foreign-key constraint rejected the write or delete
    ForeignKeyViolation,
    /// Any other storage failure; details are for logs only
    StorageFailure,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::ForeignKeyViolation => write!(f, "foreign_key_violation"),
            Self::StorageFailure => write!(f, "storage_failure"),
        }
    }
}

/// Structured repository error with operation context
///
/// ```rust
/// use cms_service::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::duplicate(RepositoryOperation::Create, "Tag");
/// assert_eq!(
///     error.to_string(),
///     "Repository duplicate error during create: Entity already exists [Tag]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Post", "Setting")
    pub entity_type: Option<String>,
    /// The identifier, slug or key involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::FindById,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create a unique-constraint error
    pub fn duplicate(operation: RepositoryOperation, entity_type: impl Into<String>) -> Self {
        Self {
            operation,
            kind: RepositoryErrorKind::Duplicate,
            message: "Entity already exists".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: None,
        }
    }

    /// Create a referential-integrity error
    pub fn foreign_key_violation(
        operation: RepositoryOperation,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind: RepositoryErrorKind::ForeignKeyViolation,
            message: "Referenced entity is missing or still in use".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: None,
        }
    }

    /// Create an opaque storage failure
    pub fn storage_failure(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::StorageFailure, message)
    }

    /// Classify a `sqlx` error raised while operating on `entity_type`
    ///
    /// Unique violations become [`RepositoryErrorKind::Duplicate`], foreign-key
    /// violations [`RepositoryErrorKind::ForeignKeyViolation`], a missing row
    /// [`RepositoryErrorKind::NotFound`]; everything else is a storage failure.
    pub fn from_sqlx(
        operation: RepositoryOperation,
        entity_type: &str,
        err: sqlx::Error,
    ) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self {
                operation,
                kind: RepositoryErrorKind::NotFound,
                message: "Entity not found".to_string(),
                entity_type: Some(entity_type.to_string()),
                entity_id: None,
            },
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::duplicate(operation, entity_type)
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                Self::foreign_key_violation(operation, entity_type)
            }
            other => Self::storage_failure(operation, other.to_string())
                .with_entity_type(entity_type),
        }
    }

    /// Closure form of [`RepositoryError::from_sqlx`] for `map_err`
    pub fn sqlx(
        operation: RepositoryOperation,
        entity_type: &'static str,
    ) -> impl FnOnce(sqlx::Error) -> Self {
        move |err| Self::from_sqlx(operation, entity_type, err)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set only the entity type
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Whether this is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.kind == RepositoryErrorKind::NotFound
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match (&self.entity_type, &self.entity_id) {
            (Some(entity_type), Some(entity_id)) => write!(f, " [{}: {}]", entity_type, entity_id)?,
            (Some(entity_type), None) => write!(f, " [{}]", entity_type)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
