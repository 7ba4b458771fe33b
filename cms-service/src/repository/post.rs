//! Postgres repository for posts, their tags and their media attachments
//!
//! Writes that touch `post_tags` run in one transaction with the post row,
//! so a failed tag insert leaves neither change behind. Every successful
//! write answers with the fully loaded [`PostDetail`].

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{like_pattern, Page, PageRequest, SetClause, SortSpec, WhereClause};
use super::traits::{Repository, RepositoryResult};
use super::{RepositoryError, RepositoryOperation};
use crate::models::{
    AttachMedia, Author, ContentType, CreatePost, FileType, Media, MediaRole, Post, PostDetail,
    PostFilter, PostMedia, PostSummary, Tag, UpdatePost, UserRole,
};

const ENTITY: &str = "Post";
const ATTACHMENT: &str = "PostMedia";

const POST_COLUMNS: &str = "cp.id, cp.content_type_id, cp.author_id, cp.title, cp.slug, \
                            cp.excerpt, cp.content, cp.metadata, cp.status, cp.published_at, \
                            cp.view_count, cp.created_at, cp.updated_at";

const SORT: SortSpec = SortSpec {
    columns: &[
        "title",
        "slug",
        "status",
        "published_at",
        "view_count",
        "created_at",
        "updated_at",
    ],
    prefix: "cp.",
    default_order: "cp.created_at DESC",
};

const DETAIL_QUERY: &str = "SELECT cp.id, cp.content_type_id, cp.author_id, cp.title, cp.slug, \
    cp.excerpt, cp.content, cp.metadata, cp.status, cp.published_at, cp.view_count, \
    cp.created_at, cp.updated_at, \
    ct.id AS ct_id, ct.name AS ct_name, ct.slug AS ct_slug, ct.schema_fields AS ct_schema_fields, \
    ct.is_active AS ct_is_active, ct.display_order AS ct_display_order, \
    ct.created_at AS ct_created_at, ct.updated_at AS ct_updated_at, \
    u.id AS u_id, u.email AS u_email, u.full_name AS u_full_name, u.role AS u_role, \
    u.is_active AS u_is_active, u.last_login AS u_last_login, \
    u.created_at AS u_created_at, u.updated_at AS u_updated_at \
    FROM content_posts cp \
    JOIN content_types ct ON cp.content_type_id = ct.id \
    JOIN users u ON cp.author_id = u.id \
    WHERE cp.id = $1";

const TAGS_QUERY: &str = "SELECT t.id, t.name, t.slug, t.created_at FROM tags t \
    JOIN post_tags pt ON t.id = pt.tag_id \
    WHERE pt.post_id = $1 ORDER BY t.name";

const MEDIA_COLUMNS: &str = "pm.id, pm.post_id, pm.media_id, pm.media_role, pm.display_order, \
    pm.created_at, m.id AS m_id, m.file_name AS m_file_name, m.object_key AS m_object_key, \
    m.bucket_name AS m_bucket_name, m.cdn_url AS m_cdn_url, m.file_type AS m_file_type, \
    m.mime_type AS m_mime_type, m.file_size AS m_file_size, m.dimensions AS m_dimensions, \
    m.variants AS m_variants, m.alt_text AS m_alt_text, m.checksum AS m_checksum, \
    m.created_at AS m_created_at";

/// The post row joined with its content type and author
#[derive(FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    post: Post,
    ct_id: Uuid,
    ct_name: String,
    ct_slug: String,
    ct_schema_fields: Option<Value>,
    ct_is_active: bool,
    ct_display_order: i32,
    ct_created_at: DateTime<Utc>,
    ct_updated_at: DateTime<Utc>,
    u_id: Uuid,
    u_email: String,
    u_full_name: String,
    u_role: UserRole,
    u_is_active: bool,
    u_last_login: Option<DateTime<Utc>>,
    u_created_at: DateTime<Utc>,
    u_updated_at: DateTime<Utc>,
}

impl DetailRow {
    fn into_detail(self, tags: Vec<Tag>, media: Vec<PostMedia>) -> PostDetail {
        PostDetail {
            post: self.post,
            content_type: ContentType {
                id: self.ct_id,
                name: self.ct_name,
                slug: self.ct_slug,
                schema_fields: self.ct_schema_fields,
                is_active: self.ct_is_active,
                display_order: self.ct_display_order,
                created_at: self.ct_created_at,
                updated_at: self.ct_updated_at,
            },
            author: Author {
                id: self.u_id,
                email: self.u_email,
                full_name: self.u_full_name,
                role: self.u_role,
                is_active: self.u_is_active,
                last_login: self.u_last_login,
                created_at: self.u_created_at,
                updated_at: self.u_updated_at,
            },
            tags,
            media,
        }
    }
}

/// A post/media association joined with its media row
#[derive(FromRow)]
struct AttachmentRow {
    id: Uuid,
    post_id: Uuid,
    media_id: Uuid,
    media_role: MediaRole,
    display_order: i32,
    created_at: DateTime<Utc>,
    m_id: Uuid,
    m_file_name: String,
    m_object_key: String,
    m_bucket_name: String,
    m_cdn_url: Option<String>,
    m_file_type: FileType,
    m_mime_type: String,
    m_file_size: i64,
    m_dimensions: Option<Value>,
    m_variants: Option<Value>,
    m_alt_text: Option<String>,
    m_checksum: Option<String>,
    m_created_at: DateTime<Utc>,
}

impl From<AttachmentRow> for PostMedia {
    fn from(row: AttachmentRow) -> Self {
        PostMedia {
            id: row.id,
            post_id: row.post_id,
            media_id: row.media_id,
            media_role: row.media_role,
            display_order: row.display_order,
            created_at: row.created_at,
            media: Some(Media {
                id: row.m_id,
                file_name: row.m_file_name,
                object_key: row.m_object_key,
                bucket_name: row.m_bucket_name,
                cdn_url: row.m_cdn_url,
                file_type: row.m_file_type,
                mime_type: row.m_mime_type,
                file_size: row.m_file_size,
                dimensions: row.m_dimensions,
                variants: row.m_variants,
                alt_text: row.m_alt_text,
                checksum: row.m_checksum,
                created_at: row.m_created_at,
            }),
        }
    }
}

/// Posts backed by `content_posts`, `post_tags` and `post_media`
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a post by slug, with the same shape as [`Repository::find_by_id`]
    pub async fn find_by_slug(&self, slug: &str) -> RepositoryResult<PostDetail> {
        let id: Uuid = sqlx::query_scalar("SELECT id FROM content_posts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindBySlug, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, slug)
                    .with_operation(RepositoryOperation::FindBySlug)
            })?;
        self.find_by_id(&id).await
    }

    /// Add one to the post's view counter
    ///
    /// Callers on the read path run this detached and only log failures.
    pub async fn increment_view_count(&self, id: Uuid) -> RepositoryResult<()> {
        sqlx::query("UPDATE content_posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(
                RepositoryOperation::IncrementViewCount,
                ENTITY,
            ))?;
        Ok(())
    }

    /// Associate a media item with a post
    ///
    /// `Duplicate` when the pair is already attached, `ForeignKeyViolation`
    /// when either side does not exist.
    pub async fn attach_media(&self, post_id: Uuid, data: AttachMedia) -> RepositoryResult<PostMedia> {
        let map_err = RepositoryError::sqlx(RepositoryOperation::AttachMedia, ATTACHMENT);
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO post_media (id, post_id, media_id, media_role, display_order) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(data.media_id)
        .bind(data.media_role)
        .bind(data.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query_as::<_, AttachmentRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM post_media pm JOIN media m ON pm.media_id = m.id \
             WHERE pm.id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(PostMedia::from)
        .map_err(RepositoryError::sqlx(RepositoryOperation::AttachMedia, ATTACHMENT))
    }

    /// Remove the association between a post and a media item
    pub async fn detach_media(&self, post_id: Uuid, media_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM post_media WHERE post_id = $1 AND media_id = $2")
            .bind(post_id)
            .bind(media_id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::DetachMedia, ATTACHMENT))?;
        if result.rows_affected() == 0 {
            return Err(
                RepositoryError::not_found(ATTACHMENT, format!("{post_id}/{media_id}"))
                    .with_operation(RepositoryOperation::DetachMedia),
            );
        }
        Ok(())
    }

    async fn load_tags(&self, post_id: Uuid) -> RepositoryResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(TAGS_QUERY)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))
    }

    async fn load_media(&self, post_id: Uuid) -> RepositoryResult<Vec<PostMedia>> {
        let rows = sqlx::query_as::<_, AttachmentRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM post_media pm JOIN media m ON pm.media_id = m.id \
             WHERE pm.post_id = $1 ORDER BY pm.display_order"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))?;
        Ok(rows.into_iter().map(PostMedia::from).collect())
    }
}

/// Link `tag_ids` to a post; links that already exist are kept as-is
async fn attach_tags(
    conn: &mut PgConnection,
    post_id: Uuid,
    tag_ids: &[Uuid],
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    for tag_id in tag_ids {
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::sqlx(operation, "Tag"))?;
    }
    Ok(())
}

fn filtered(head: String, filter: &PostFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    let mut clause = WhereClause::new();
    if let Some(content_type_id) = filter.content_type_id {
        clause
            .next(&mut builder)
            .push("cp.content_type_id = ")
            .push_bind(content_type_id);
    }
    if let Some(author_id) = filter.author_id {
        clause
            .next(&mut builder)
            .push("cp.author_id = ")
            .push_bind(author_id);
    }
    if let Some(status) = filter.status {
        clause.next(&mut builder).push("cp.status = ").push_bind(status);
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        clause
            .next(&mut builder)
            .push("(cp.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR cp.excerpt ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder
}

fn count_query(filter: &PostFilter) -> QueryBuilder<'static, Postgres> {
    filtered("SELECT COUNT(*) FROM content_posts cp".to_string(), filter)
}

fn page_query(filter: &PostFilter, page: &PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered(
        format!(
            "SELECT {POST_COLUMNS}, ct.name AS content_type_name, ct.slug AS content_type_slug, \
             u.full_name AS author_name \
             FROM content_posts cp \
             JOIN content_types ct ON cp.content_type_id = ct.id \
             JOIN users u ON cp.author_id = u.id"
        ),
        filter,
    );
    SORT.push_page(&mut builder, page);
    builder
}

/// `UPDATE` for the post columns present in `data`; `None` when there are none
fn update_query(id: Uuid, data: &mut UpdatePost) -> Option<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("UPDATE content_posts");
    let mut set = SetClause::new();
    if let Some(content_type_id) = data.content_type_id {
        set.next(&mut builder)
            .push("content_type_id = ")
            .push_bind(content_type_id);
    }
    if let Some(title) = data.title.take() {
        set.next(&mut builder).push("title = ").push_bind(title);
    }
    if let Some(slug) = data.slug.take() {
        set.next(&mut builder).push("slug = ").push_bind(slug);
    }
    if let Some(excerpt) = std::mem::take(&mut data.excerpt).into_update() {
        set.next(&mut builder).push("excerpt = ").push_bind(excerpt);
    }
    if let Some(content) = std::mem::take(&mut data.content).into_update() {
        set.next(&mut builder).push("content = ").push_bind(content);
    }
    if let Some(metadata) = std::mem::take(&mut data.metadata).into_update() {
        set.next(&mut builder)
            .push("metadata = ")
            .push_bind(metadata.map(Json));
    }
    if let Some(status) = data.status {
        set.next(&mut builder).push("status = ").push_bind(status);
    }
    if let Some(published_at) = std::mem::take(&mut data.published_at).into_update() {
        set.next(&mut builder)
            .push("published_at = ")
            .push_bind(published_at);
    }
    if set.is_empty() {
        return None;
    }
    builder.push(" WHERE id = ").push_bind(id);
    Some(builder)
}

impl Repository for PostRepository {
    type Id = Uuid;
    type Entity = PostDetail;
    type Summary = PostSummary;
    type Create = CreatePost;
    type Update = UpdatePost;
    type Filter = PostFilter;

    /// Post, content type and author in one query, then tags, then media
    async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<PostDetail> {
        let row = sqlx::query_as::<_, DetailRow>(DETAIL_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id.to_string()))?;

        let tags = self.load_tags(*id).await?;
        let media = self.load_media(*id).await?;
        Ok(row.into_detail(tags, media))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Page<PostSummary>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        let items = page_query(filter, page)
            .build_query_as::<PostSummary>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        Ok(Page::new(items, total, page))
    }

    async fn create(&self, data: CreatePost) -> RepositoryResult<PostDetail> {
        let map_err = || RepositoryError::sqlx(RepositoryOperation::Create, ENTITY);
        let id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.map_err(map_err())?;

        sqlx::query(
            "INSERT INTO content_posts \
             (id, content_type_id, author_id, title, slug, excerpt, content, metadata, status, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(id)
        .bind(data.content_type_id)
        .bind(data.author_id)
        .bind(data.title)
        .bind(data.slug)
        .bind(data.excerpt)
        .bind(data.content)
        .bind(data.metadata.map(Json))
        .bind(data.status)
        .bind(data.published_at)
        .execute(&mut *tx)
        .await
        .map_err(map_err())?;

        attach_tags(&mut tx, id, &data.tag_ids, RepositoryOperation::Create).await?;

        tx.commit().await.map_err(map_err())?;

        self.find_by_id(&id).await
    }

    /// Column changes and a `tag_ids` replacement commit together
    async fn update(&self, id: &Uuid, mut data: UpdatePost) -> RepositoryResult<PostDetail> {
        let map_err = || RepositoryError::sqlx(RepositoryOperation::Update, ENTITY);
        let not_found = || {
            RepositoryError::not_found(ENTITY, id.to_string())
                .with_operation(RepositoryOperation::Update)
        };
        let tag_ids = data.tag_ids.take();

        let mut tx = self.pool.begin().await.map_err(map_err())?;

        match update_query(*id, &mut data) {
            Some(mut query) => {
                let result = query.build().execute(&mut *tx).await.map_err(map_err())?;
                if result.rows_affected() == 0 {
                    return Err(not_found());
                }
            }
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM content_posts WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(map_err())?;
                if !exists {
                    return Err(not_found());
                }
            }
        }

        if let Some(tag_ids) = tag_ids {
            sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_err())?;
            attach_tags(&mut tx, *id, &tag_ids, RepositoryOperation::Update).await?;
        }

        tx.commit().await.map_err(map_err())?;

        self.find_by_id(id).await
    }

    /// Tags and media links go with the post; the media rows stay
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM content_posts WHERE id = $1")
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
