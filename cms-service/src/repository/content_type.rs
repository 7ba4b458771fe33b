//! Postgres repository for content types

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{Page, PageRequest, SetClause, SortSpec, WhereClause};
use super::traits::{Repository, RepositoryResult};
use super::{RepositoryError, RepositoryOperation};
use crate::models::{ContentType, ContentTypeFilter, CreateContentType, UpdateContentType};

const ENTITY: &str = "ContentType";
const COLUMNS: &str =
    "id, name, slug, schema_fields, is_active, display_order, created_at, updated_at";

const SORT: SortSpec = SortSpec {
    columns: &["name", "slug", "display_order", "created_at", "updated_at"],
    prefix: "",
    default_order: "display_order ASC, created_at DESC",
};

/// Content types backed by the `content_types` table
#[derive(Debug, Clone)]
pub struct ContentTypeRepository {
    pool: PgPool,
}

impl ContentTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepositoryResult<ContentType> {
        sqlx::query_as::<_, ContentType>(&format!(
            "SELECT {COLUMNS} FROM content_types WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::FindBySlug, ENTITY))?
        .ok_or_else(|| {
            RepositoryError::not_found(ENTITY, slug).with_operation(RepositoryOperation::FindBySlug)
        })
    }
}

fn filtered(head: String, filter: &ContentTypeFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    let mut clause = WhereClause::new();
    if let Some(is_active) = filter.is_active {
        clause.next(&mut builder).push("is_active = ").push_bind(is_active);
    }
    builder
}

fn count_query(filter: &ContentTypeFilter) -> QueryBuilder<'static, Postgres> {
    filtered("SELECT COUNT(*) FROM content_types".to_string(), filter)
}

fn page_query(filter: &ContentTypeFilter, page: &PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered(format!("SELECT {COLUMNS} FROM content_types"), filter);
    SORT.push_page(&mut builder, page);
    builder
}

fn update_query(id: Uuid, data: UpdateContentType) -> Option<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("UPDATE content_types");
    let mut set = SetClause::new();
    if let Some(name) = data.name {
        set.next(&mut builder).push("name = ").push_bind(name);
    }
    if let Some(slug) = data.slug {
        set.next(&mut builder).push("slug = ").push_bind(slug);
    }
    if let Some(schema_fields) = data.schema_fields.into_update() {
        set.next(&mut builder)
            .push("schema_fields = ")
            .push_bind(schema_fields.map(Json));
    }
    if let Some(is_active) = data.is_active {
        set.next(&mut builder).push("is_active = ").push_bind(is_active);
    }
    if let Some(display_order) = data.display_order {
        set.next(&mut builder)
            .push("display_order = ")
            .push_bind(display_order);
    }
    if set.is_empty() {
        return None;
    }
    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {COLUMNS}"));
    Some(builder)
}

impl Repository for ContentTypeRepository {
    type Id = Uuid;
    type Entity = ContentType;
    type Summary = ContentType;
    type Create = CreateContentType;
    type Update = UpdateContentType;
    type Filter = ContentTypeFilter;

    async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<ContentType> {
        sqlx::query_as::<_, ContentType>(&format!(
            "SELECT {COLUMNS} FROM content_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))?
        .ok_or_else(|| RepositoryError::not_found(ENTITY, id.to_string()))
    }

    async fn list(
        &self,
        filter: &ContentTypeFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Page<ContentType>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        let items = page_query(filter, page)
            .build_query_as::<ContentType>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        Ok(Page::new(items, total, page))
    }

    async fn create(&self, data: CreateContentType) -> RepositoryResult<ContentType> {
        sqlx::query_as::<_, ContentType>(&format!(
            "INSERT INTO content_types (id, name, slug, schema_fields, is_active, display_order) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.slug)
        .bind(data.schema_fields.map(Json))
        .bind(data.is_active.unwrap_or(true))
        .bind(data.display_order.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::Create, ENTITY))
    }

    async fn update(&self, id: &Uuid, data: UpdateContentType) -> RepositoryResult<ContentType> {
        let Some(mut query) = update_query(*id, data) else {
            return self.find_by_id(id).await;
        };
        query
            .build_query_as::<ContentType>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Update, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, id.to_string())
                    .with_operation(RepositoryOperation::Update)
            })
    }

    /// Rejected with `ForeignKeyViolation` while posts still use the type
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM content_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Delete, ENTITY))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, id.to_string())
                .with_operation(RepositoryOperation::Delete));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patch;
    use serde_json::json;

    #[test]
    fn test_default_order() {
        assert_eq!(
            page_query(&ContentTypeFilter::default(), &PageRequest::default()).sql(),
            format!(
                "SELECT {COLUMNS} FROM content_types \
                 ORDER BY display_order ASC, created_at DESC LIMIT $1 OFFSET $2"
            )
        );
    }

    #[test]
    fn test_active_filter() {
        let filter = ContentTypeFilter {
            is_active: Some(false),
        };
        assert_eq!(
            count_query(&filter).sql(),
            "SELECT COUNT(*) FROM content_types WHERE is_active = $1"
        );
    }

    #[test]
    fn test_update_can_clear_schema() {
        let query = update_query(
            Uuid::nil(),
            UpdateContentType {
                schema_fields: Patch::Null,
                display_order: Some(3),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(query
            .sql()
            .starts_with("UPDATE content_types SET schema_fields = $1, display_order = $2 WHERE id = $3"));
    }

    #[test]
    fn test_update_with_value() {
        let query = update_query(
            Uuid::nil(),
            UpdateContentType {
                schema_fields: Patch::Value(json!({ "fields": [] })),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(query.sql().starts_with("UPDATE content_types SET schema_fields = $1 WHERE"));
    }
}
