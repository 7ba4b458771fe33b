//! Postgres repository for tags

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{like_pattern, Page, PageRequest, SetClause, SortSpec, WhereClause};
use super::traits::{Repository, RepositoryResult};
use super::{RepositoryError, RepositoryOperation};
use crate::models::{CreateTag, Tag, TagFilter, UpdateTag};

const ENTITY: &str = "Tag";
const COLUMNS: &str = "id, name, slug, created_at";

const SORT: SortSpec = SortSpec {
    columns: &["name", "slug", "created_at"],
    prefix: "",
    default_order: "name ASC",
};

/// Tags backed by the `tags` table
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Tag> {
        sqlx::query_as::<_, Tag>(&format!("SELECT {COLUMNS} FROM tags WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindBySlug, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, slug)
                    .with_operation(RepositoryOperation::FindBySlug)
            })
    }
}

fn filtered(head: String, filter: &TagFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    let mut clause = WhereClause::new();
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        clause
            .next(&mut builder)
            .push("(name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR slug ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder
}

fn count_query(filter: &TagFilter) -> QueryBuilder<'static, Postgres> {
    filtered("SELECT COUNT(*) FROM tags".to_string(), filter)
}

fn page_query(filter: &TagFilter, page: &PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered(format!("SELECT {COLUMNS} FROM tags"), filter);
    SORT.push_page(&mut builder, page);
    builder
}

fn update_query(id: Uuid, data: UpdateTag) -> Option<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("UPDATE tags");
    let mut set = SetClause::new();
    if let Some(name) = data.name {
        set.next(&mut builder).push("name = ").push_bind(name);
    }
    if let Some(slug) = data.slug {
        set.next(&mut builder).push("slug = ").push_bind(slug);
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

impl Repository for TagRepository {
    type Id = Uuid;
    type Entity = Tag;
    type Summary = Tag;
    type Create = CreateTag;
    type Update = UpdateTag;
    type Filter = TagFilter;

    async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Tag> {
        sqlx::query_as::<_, Tag>(&format!("SELECT {COLUMNS} FROM tags WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id.to_string()))
    }

    async fn list(&self, filter: &TagFilter, page: &PageRequest) -> RepositoryResult<Page<Tag>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        let items = page_query(filter, page)
            .build_query_as::<Tag>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        Ok(Page::new(items, total, page))
    }

    async fn create(&self, data: CreateTag) -> RepositoryResult<Tag> {
        sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::Create, ENTITY))
    }

    async fn update(&self, id: &Uuid, data: UpdateTag) -> RepositoryResult<Tag> {
        let Some(mut query) = update_query(*id, data) else {
            return self.find_by_id(id).await;
        };
        query
            .build_query_as::<Tag>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Update, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, id.to_string())
                    .with_operation(RepositoryOperation::Update)
            })
    }

    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
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
