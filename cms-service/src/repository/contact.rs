//! Postgres repository for contact-form submissions

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination::{like_pattern, Page, PageRequest, SetClause, SortSpec, WhereClause};
use super::traits::{Repository, RepositoryResult};
use super::{RepositoryError, RepositoryOperation};
use crate::models::{ContactFilter, ContactStatus, ContactSubmission, NewContact, UpdateContact};

const ENTITY: &str = "ContactSubmission";
const COLUMNS: &str = "id, name, email, phone, subject, message, status, ip_address, \
                       user_agent, metadata, read_at, created_at";

const SORT: SortSpec = SortSpec {
    columns: &["name", "email", "status", "created_at"],
    prefix: "",
    default_order: "created_at DESC",
};

/// Submissions backed by the `contact_submissions` table
#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Number of submissions still in the `new` state
    pub async fn count_unread(&self) -> RepositoryResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions WHERE status = $1")
            .bind(ContactStatus::New)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Count, ENTITY))
    }
}

fn filtered(head: String, filter: &ContactFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    let mut clause = WhereClause::new();
    if let Some(status) = filter.status {
        clause.next(&mut builder).push("status = ").push_bind(status);
    }
    if let Some(email) = filter.email.as_deref() {
        clause
            .next(&mut builder)
            .push("email ILIKE ")
            .push_bind(like_pattern(email));
    }
    builder
}

fn count_query(filter: &ContactFilter) -> QueryBuilder<'static, Postgres> {
    filtered("SELECT COUNT(*) FROM contact_submissions".to_string(), filter)
}

fn page_query(filter: &ContactFilter, page: &PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered(format!("SELECT {COLUMNS} FROM contact_submissions"), filter);
    SORT.push_page(&mut builder, page);
    builder
}

/// Moving a submission to `read` stamps `read_at`
fn update_query(id: Uuid, data: UpdateContact) -> Option<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("UPDATE contact_submissions");
    let mut set = SetClause::new();
    if let Some(status) = data.status {
        set.next(&mut builder).push("status = ").push_bind(status);
        if status == ContactStatus::Read {
            set.next(&mut builder).push("read_at = NOW()");
        }
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

impl Repository for ContactRepository {
    type Id = Uuid;
    type Entity = ContactSubmission;
    type Summary = ContactSubmission;
    type Create = NewContact;
    type Update = UpdateContact;
    type Filter = ContactFilter;

    async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<ContactSubmission> {
        sqlx::query_as::<_, ContactSubmission>(&format!(
            "SELECT {COLUMNS} FROM contact_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::FindById, ENTITY))?
        .ok_or_else(|| RepositoryError::not_found(ENTITY, id.to_string()))
    }

    async fn list(
        &self,
        filter: &ContactFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Page<ContactSubmission>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        let items = page_query(filter, page)
            .build_query_as::<ContactSubmission>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::List, ENTITY))?;

        Ok(Page::new(items, total, page))
    }

    async fn create(&self, data: NewContact) -> RepositoryResult<ContactSubmission> {
        let NewContact {
            submission,
            ip_address,
            user_agent,
        } = data;

        sqlx::query_as::<_, ContactSubmission>(&format!(
            "INSERT INTO contact_submissions \
             (id, name, email, phone, subject, message, status, ip_address, user_agent, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(submission.name)
        .bind(submission.email)
        .bind(submission.phone)
        .bind(submission.subject)
        .bind(submission.message)
        .bind(ContactStatus::New)
        .bind(ip_address)
        .bind(user_agent)
        .bind(submission.metadata.map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::sqlx(RepositoryOperation::Create, ENTITY))
    }

    async fn update(&self, id: &Uuid, data: UpdateContact) -> RepositoryResult<ContactSubmission> {
        let Some(mut query) = update_query(*id, data) else {
            return self.find_by_id(id).await;
        };
        query
            .build_query_as::<ContactSubmission>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::sqlx(RepositoryOperation::Update, ENTITY))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, id.to_string())
                    .with_operation(RepositoryOperation::Update)
            })
    }

    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
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

    #[test]
    fn test_read_status_stamps_read_at() {
        let query = update_query(
            Uuid::nil(),
            UpdateContact {
                status: Some(ContactStatus::Read),
            },
        )
        .unwrap();
        assert!(query.sql().starts_with(
            "UPDATE contact_submissions SET status = $1, read_at = NOW() WHERE id = $2"
        ));
    }

    #[test]
    fn test_other_status_leaves_read_at() {
        let query = update_query(
            Uuid::nil(),
            UpdateContact {
                status: Some(ContactStatus::Replied),
            },
        )
        .unwrap();
        assert!(!query.sql().contains("read_at = NOW()"));
        assert!(update_query(Uuid::nil(), UpdateContact::default()).is_none());
    }

    #[test]
    fn test_status_and_email_filters() {
        let filter = ContactFilter {
            status: Some(ContactStatus::New),
            email: Some("example.com".into()),
        };
        assert_eq!(
            count_query(&filter).sql(),
            "SELECT COUNT(*) FROM contact_submissions WHERE status = $1 AND email ILIKE $2"
        );
    }
}
