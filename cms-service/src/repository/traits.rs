//! Repository trait for the CRUD surface shared by every entity
//!
//! Uses RPITIT (return position `impl Trait` in traits), so implementations are
//! written as plain `async fn` without `async_trait`.

use std::future::Future;

use super::error::RepositoryError;
use super::pagination::{Page, PageRequest};

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// CRUD operations over one entity
///
/// - `Id`: how the entity is addressed (`Uuid`, or `str` for settings keys)
/// - `Entity`: the fully loaded entity returned by reads and writes
/// - `Summary`: the row shape returned by [`Repository::list`]
/// - `Filter`: entity-specific list filters; absent fields are not applied
///
/// Every method reports failures with one of the four
/// [`RepositoryErrorKind`](super::RepositoryErrorKind) values.
pub trait Repository: Send + Sync {
    /// Identifier type
    type Id: ?Sized + Sync;
    /// Fully loaded entity
    type Entity: Send;
    /// List row
    type Summary: Send;
    /// Creation payload
    type Create: Send;
    /// Partial-update payload
    type Update: Send;
    /// List filters
    type Filter: Sync;

    /// Load one entity, or `NotFound`
    fn find_by_id(
        &self,
        id: &Self::Id,
    ) -> impl Future<Output = RepositoryResult<Self::Entity>> + Send;

    /// Load one page of entities matching `filter`, with the total match count
    fn list(
        &self,
        filter: &Self::Filter,
        page: &PageRequest,
    ) -> impl Future<Output = RepositoryResult<Page<Self::Summary>>> + Send;

    /// Insert a new entity and return it as stored
    ///
    /// Unique violations surface as `Duplicate`, dangling references as
    /// `ForeignKeyViolation`.
    fn create(
        &self,
        data: Self::Create,
    ) -> impl Future<Output = RepositoryResult<Self::Entity>> + Send;

    /// Apply the fields present in `data` and return the fresh entity
    ///
    /// Fields absent from `data` are left unmodified.
    fn update(
        &self,
        id: &Self::Id,
        data: Self::Update,
    ) -> impl Future<Output = RepositoryResult<Self::Entity>> + Send;

    /// Remove an entity
    ///
    /// `NotFound` when nothing matched; `ForeignKeyViolation` when other rows
    /// still reference it.
    fn delete(&self, id: &Self::Id) -> impl Future<Output = RepositoryResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{RepositoryErrorKind, RepositoryOperation};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Label {
        slug: String,
        name: String,
    }

    struct LabelUpdate {
        name: Option<String>,
    }

    #[derive(Default)]
    struct InMemoryLabels {
        rows: Mutex<BTreeMap<String, Label>>,
    }

    impl Repository for InMemoryLabels {
        type Id = str;
        type Entity = Label;
        type Summary = Label;
        type Create = Label;
        type Update = LabelUpdate;
        type Filter = ();

        async fn find_by_id(&self, id: &str) -> RepositoryResult<Label> {
            self.rows
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| RepositoryError::not_found("Label", id))
        }

        async fn list(&self, _filter: &(), page: &PageRequest) -> RepositoryResult<Page<Label>> {
            let rows = self.rows.lock().unwrap();
            let items = rows
                .values()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .cloned()
                .collect();
            Ok(Page::new(items, rows.len() as i64, page))
        }

        async fn create(&self, data: Label) -> RepositoryResult<Label> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&data.slug) {
                return Err(RepositoryError::duplicate(RepositoryOperation::Create, "Label"));
            }
            rows.insert(data.slug.clone(), data.clone());
            Ok(data)
        }

        async fn update(&self, id: &str, data: LabelUpdate) -> RepositoryResult<Label> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.get_mut(id).ok_or_else(|| {
                RepositoryError::not_found("Label", id).with_operation(RepositoryOperation::Update)
            })?;
            if let Some(name) = data.name {
                row.name = name;
            }
            Ok(row.clone())
        }

        async fn delete(&self, id: &str) -> RepositoryResult<()> {
            self.rows
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| {
                    RepositoryError::not_found("Label", id)
                        .with_operation(RepositoryOperation::Delete)
                })
        }
    }

    fn label(slug: &str) -> Label {
        Label {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_second_create_with_same_key_is_duplicate() {
        let repo = InMemoryLabels::default();
        repo.create(label("news")).await.unwrap();

        let err = repo.create(label("news")).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::Duplicate);
        assert_eq!(repo.find_by_id("news").await.unwrap().name, "NEWS");
    }

    #[tokio::test]
    async fn test_partial_update_leaves_absent_fields() {
        let repo = InMemoryLabels::default();
        repo.create(label("news")).await.unwrap();

        let unchanged = repo.update("news", LabelUpdate { name: None }).await.unwrap();
        assert_eq!(unchanged.name, "NEWS");

        let renamed = repo
            .update("news", LabelUpdate { name: Some("Headlines".into()) })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Headlines");
        assert_eq!(renamed.slug, "news");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let repo = InMemoryLabels::default();
        repo.create(label("news")).await.unwrap();
        repo.delete("news").await.unwrap();

        assert!(repo.find_by_id("news").await.unwrap_err().is_not_found());
        assert!(repo.delete("news").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_reports_total_across_pages() {
        let repo = InMemoryLabels::default();
        for slug in ["a", "b", "c"] {
            repo.create(label(slug)).await.unwrap();
        }

        let page = repo
            .list(&(), &PageRequest::new(Some(2), Some(2), None, None))
            .await
            .unwrap();
        assert_eq!(page.items, vec![label("c")]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);
    }
}
