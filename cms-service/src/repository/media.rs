//! Postgres repository for media metadata

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{like_pattern, Page, PageRequest, SetClause, SortSpec, WhereClause};
use super::traits::{Repository, RepositoryResult};
use super::{RepositoryError, RepositoryOperation};
use crate::models::{CreateMedia, FileType, Media, MediaFilter, UpdateMedia};

const ENTITY: &str = "Media";
const COLUMNS: &str = "id, file_name, object_key, bucket_name, cdn_url, file_type, mime_type, \
                       file_size, dimensions, variants, alt_text, checksum, created_at";

const SORT: SortSpec = SortSpec {
    columns: &["file_name", "file_type", "mime_type", "file_size", "created_at"],
    prefix: "",
    default_order: "created_at DESC",
};

/// Media metadata backed by the `media` table
#[derive(Debug, Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn filtered(head: String, filter: &MediaFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    let mut clause = WhereClause::new();
    if let Some(file_type) = filter.file_type {
        clause.next(&mut builder).push("file_type = ").push_bind(file_type);
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        clause
            .next(&mut builder)
            .push("(file_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR alt_text ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder
}

fn count_query(filter: &MediaFilter) -> QueryBuilder<'static, Postgres> {
    filtered("SELECT COUNT(*) FROM media".to_string(), filter)
}

fn page_query(filter: &MediaFilter, page: &PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered(format!("SELECT {COLUMNS} FROM media"), filter);
    SORT.push_page(&mut builder, page);
    builder
}

fn update_query(id: Uuid, data: UpdateMedia) -> Option<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("UPDATE media");
    let mut set = SetClause::new();
    if let Some(file_name) = data.file_name {
        set.next(&mut builder).push("file_name = ").push_bind(file_name);
    }
    if let Some(cdn_url) = data.cdn_url.into_update() {
        set.next(&mut builder).push("cdn_url = ").push_bind(cdn_url);
    }
    if let Some(dimensions) = data.dimensions.into_update() {
        set.next(&mut builder)
            .push("dimensions = ")
            .push_bind(dimensions.map(Json));
    }
    if let Some(variants) = data.variants.into_update() {
        set.next(&mut builder)
            .push("variants = ")
            .push_bind(variants.map(Json));
    }
    if let Some(alt_text) = data.alt_text.into_update() {
        set.next(&mut builder).push("alt_text = ").push_bind(alt_text);
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

impl Repository for MediaRepository {
    type Id = Uuid;
    type Entity = Media;
    type Summary = Media;
    type Create = CreateMedia;
    type Update = UpdateMedia;
    type Filter = MediaFilter;

    async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Media> {
        sqlx::query_as::<_, Media>(&format!("SELECT {COLUMNS} FROM media WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id.to_string()))
    }

    async fn list(&self, filter: &MediaFilter, page: &PageRequest) -> RepositoryResult<Page<Media>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        let items = page_query(filter, page)
            .build_query_as::<Media>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        Ok(Page::new(items, total, page))
    }

    async fn create(&self, data: CreateMedia) -> RepositoryResult<Media> {
        sqlx::query_as::<_, Media>(&format!(
            "INSERT INTO media (id, file_name, object_key, bucket_name, cdn_url, file_type, \
             mime_type, file_size, dimensions, variants, alt_text, checksum) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.file_name)
        .bind(data.object_key)
        .bind(data.bucket_name)
        .bind(data.cdn_url)
        // `CreateMedia::validate` rejects a missing type before this point
        .bind(data.file_type.unwrap_or(FileType::Document))
        .bind(data.mime_type)
        .bind(data.file_size)
        .bind(data.dimensions.map(Json))
        .bind(data.variants.map(Json))
        .bind(data.alt_text)
        .bind(data.checksum)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::Create, ENTITY))
    }

    async fn update(&self, id: &Uuid, data: UpdateMedia) -> RepositoryResult<Media> {
        let Some(mut query) = update_query(*id, data) else {
            return self.find_by_id(id).await;
        };
        query
            .build_query_as::<Media>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Update, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, id.to_string())
                    .with_operation(RepositoryOperation::Update)
            })
    }

    /// Rejected with `ForeignKeyViolation` while any post has it attached
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
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

    #[test]
    fn test_filters_combine_with_and() {
        let filter = MediaFilter {
            file_type: Some(FileType::Image),
            search: Some("cat".into()),
        };
        assert_eq!(
            count_query(&filter).sql(),
            "SELECT COUNT(*) FROM media WHERE file_type = $1 AND (file_name ILIKE $2 OR alt_text ILIKE $3)"
        );
    }

    #[test]
    fn test_sort_by_file_size() {
        let page = PageRequest::new(Some(2), Some(10), Some("file_size".into()), Some("asc"));
        assert!(page_query(&MediaFilter::default(), &page)
            .sql()
            .ends_with("FROM media ORDER BY file_size ASC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_update_clears_and_sets() {
        let query = update_query(
            Uuid::nil(),
            UpdateMedia {
                alt_text: Patch::Value("A cat".into()),
                cdn_url: Patch::Null,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(query
            .sql()
            .starts_with("UPDATE media SET cdn_url = $1, alt_text = $2 WHERE id = $3 RETURNING"));
    }

    #[test]
    fn test_empty_update_is_skipped() {
        assert!(update_query(Uuid::nil(), UpdateMedia::default()).is_none());
    }
}
