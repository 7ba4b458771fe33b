//! Postgres repository for settings, addressed by key

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{like_pattern, Page, PageRequest, SetClause, SortSpec, WhereClause};
use super::traits::{Repository, RepositoryResult};
use super::{RepositoryError, RepositoryOperation};
use crate::models::{CreateSetting, Setting, SettingFilter, UpdateSetting};

const ENTITY: &str = "Setting";
const COLUMNS: &str = "id, key, value, description, updated_at";

const SORT: SortSpec = SortSpec {
    columns: &["key", "updated_at"],
    prefix: "",
    default_order: "key ASC",
};

/// Settings backed by the `settings` table
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert, or replace `value` and `description` of an existing key
    pub async fn upsert(&self, data: CreateSetting) -> RepositoryResult<Setting> {
        sqlx::query_as::<_, Setting>(&format!(
            "INSERT INTO settings (id, key, value, description) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (key) DO UPDATE \
             SET value = EXCLUDED.value, description = EXCLUDED.description, updated_at = NOW() \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.key)
        .bind(data.value)
        .bind(data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::Upsert, ENTITY))
    }

    /// Values for the requested keys in one round-trip
    ///
    /// Keys that do not exist, or whose value is null, are absent from the map.
    pub async fn get_multiple(&self, keys: &[String]) -> RepositoryResult<HashMap<String, String>> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT key, value FROM settings WHERE key = ANY($1)")
                .bind(keys)
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::sqlx(RepositoryOperation::BulkGet, ENTITY))?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect())
    }
}

fn filtered(head: String, filter: &SettingFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    let mut clause = WhereClause::new();
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        clause
            .next(&mut builder)
            .push("(key ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder
}

fn count_query(filter: &SettingFilter) -> QueryBuilder<'static, Postgres> {
    filtered("SELECT COUNT(*) FROM settings".to_string(), filter)
}

fn page_query(filter: &SettingFilter, page: &PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered(format!("SELECT {COLUMNS} FROM settings"), filter);
    SORT.push_page(&mut builder, page);
    builder
}

fn update_query(key: &str, data: UpdateSetting) -> Option<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("UPDATE settings");
    let mut set = SetClause::new();
    if let Some(value) = data.value.into_update() {
        set.next(&mut builder).push("value = ").push_bind(value);
    }
    if let Some(description) = data.description.into_update() {
        set.next(&mut builder)
            .push("description = ")
            .push_bind(description);
    }
    if set.is_empty() {
        return None;
    }
    builder
        .push(" WHERE key = ")
        .push_bind(key.to_string())
        .push(format!(" RETURNING {COLUMNS}"));
    Some(builder)
}

impl Repository for SettingRepository {
    type Id = str;
    type Entity = Setting;
    type Summary = Setting;
    type Create = CreateSetting;
    type Update = UpdateSetting;
    type Filter = SettingFilter;

    async fn find_by_id(&self, key: &str) -> RepositoryResult<Setting> {
        sqlx::query_as::<_, Setting>(&format!("SELECT {COLUMNS} FROM settings WHERE key = $1"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::FindBySlug, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, key)
                    .with_operation(RepositoryOperation::FindBySlug)
            })
    }

    async fn list(
        &self,
        filter: &SettingFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Page<Setting>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        let items = page_query(filter, page)
            .build_query_as::<Setting>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        Ok(Page::new(items, total, page))
    }

    async fn create(&self, data: CreateSetting) -> RepositoryResult<Setting> {
        sqlx::query_as::<_, Setting>(&format!(
            "INSERT INTO settings (id, key, value, description) VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.key)
        .bind(data.value)
        .bind(data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::Create, ENTITY))
    }

    async fn update(&self, key: &str, data: UpdateSetting) -> RepositoryResult<Setting> {
        let Some(mut query) = update_query(key, data) else {
            return self.find_by_id(key).await;
        };
        query
            .build_query_as::<Setting>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Update, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, key).with_operation(RepositoryOperation::Update)
            })
    }

    async fn delete(&self, key: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Delete, ENTITY))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, key)
                .with_operation(RepositoryOperation::Delete));
        }
        Ok(())
    }
}
