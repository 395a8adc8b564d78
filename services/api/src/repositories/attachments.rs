//! Attachment repository for database operations
//!
//! PostgreSQL implementation of the asset core's [`AttachmentStore`], plus
//! the listing used by the local media provider.

use std::collections::{BTreeMap, HashMap};

use assets::item::ProviderMeta;
use assets::store::AttachmentMetadata;
use assets::{
    AttachmentStore, LocalId, LocalRecord, NewLocalRecord, OrderDirection, Query, StoreError,
};
use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};

const COLUMNS: &str = "id, slug, title, parent_id, author_id, description, caption, mime_type, \
                       guid, provider_meta, meta, metadata, created_at";

/// Attachment repository for database operations
#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Owner of a record; `None` when the record or its author is unknown
    pub async fn author_of(&self, id: LocalId) -> Result<Option<Uuid>, StoreError> {
        let row = sqlx::query("SELECT author_id FROM attachments WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => row.try_get("author_id").map_err(backend),
            None => Ok(None),
        }
    }

    /// One page of records matching `query`, with the total match count
    pub async fn list(
        &self,
        query: &Query,
        limit: u32,
    ) -> Result<(Vec<LocalRecord>, i64), StoreError> {
        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM attachments"));
        push_filters(&mut select, query);

        let column = match query.order_by.as_deref() {
            Some("title") => "title",
            Some("modified") => "updated_at",
            _ => "created_at",
        };
        let direction = query.order_direction.unwrap_or(OrderDirection::Desc);
        select.push(format!(" ORDER BY {column} {}", direction.as_str()));

        let offset = i64::from(query.page.saturating_sub(1)) * i64::from(limit);
        select
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM attachments");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        Ok((records, total))
    }
}

#[async_trait]
impl AttachmentStore for AttachmentRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LocalRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM attachments WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<HashMap<String, LocalRecord>, StoreError> {
        if slugs.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM attachments WHERE slug = ANY($1)"
        ))
        .bind(slugs)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|row| record_from_row(row).map(|record| (record.slug.clone(), record)))
            .collect()
    }

    async fn create(
        &self,
        record: NewLocalRecord,
        provider_meta: &ProviderMeta,
    ) -> Result<LocalRecord, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO attachments
                (id, slug, title, parent_id, author_id, description, caption, mime_type,
                 guid, provider_meta, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&record.slug)
        .bind(&record.title)
        .bind(record.parent_id.map(|parent| parent.0))
        .bind(record.author_id)
        .bind(&record.description)
        .bind(&record.caption)
        .bind(&record.mime_type)
        .bind(&record.guid)
        .bind(Json(provider_meta))
        .bind(Json(&record.metadata))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| creation_error(e, &record.slug))?;

        record_from_row(&row)
    }

    async fn attach_meta(&self, id: LocalId, key: &str, value: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attachments
            SET meta = meta || jsonb_build_object($2::text, $3::text), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn get(&self, id: LocalId) -> Result<Option<LocalRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM attachments WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(record_from_row).transpose()
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &Query) {
    builder.push(" WHERE TRUE");

    if let Some(search) = &query.search_text {
        let pattern = format!("%{search}%");
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR caption ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(filter) = &query.mime_type_filter {
        let types: Vec<String> = filter.iter().map(str::to_string).collect();
        builder
            .push(" AND (mime_type = ANY(")
            .push_bind(types.clone())
            .push(") OR split_part(mime_type, '/', 1) = ANY(")
            .push_bind(types)
            .push("))");
    }
    if let Some(year) = query.year {
        builder
            .push(" AND EXTRACT(YEAR FROM created_at)::int = ")
            .push_bind(year);
    }
    if let Some(month) = query.month {
        builder
            .push(" AND EXTRACT(MONTH FROM created_at)::int = ")
            .push_bind(month as i32);
    }
    if let Some(parent) = query.parent_id {
        builder.push(" AND parent_id = ").push_bind(parent.0);
    }
}

fn record_from_row(row: &PgRow) -> Result<LocalRecord, StoreError> {
    let parent_id: Option<Uuid> = row.try_get("parent_id").map_err(backend)?;
    let Json(provider_meta): Json<ProviderMeta> = row.try_get("provider_meta").map_err(backend)?;
    let Json(meta): Json<BTreeMap<String, String>> = row.try_get("meta").map_err(backend)?;
    let Json(metadata): Json<AttachmentMetadata> = row.try_get("metadata").map_err(backend)?;

    Ok(LocalRecord {
        id: LocalId(row.try_get("id").map_err(backend)?),
        slug: row.try_get("slug").map_err(backend)?,
        title: row.try_get("title").map_err(backend)?,
        parent_id: parent_id.map(LocalId),
        author_id: row.try_get("author_id").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        caption: row.try_get("caption").map_err(backend)?,
        mime_type: row.try_get("mime_type").map_err(backend)?,
        guid: row.try_get("guid").map_err(backend)?,
        provider_meta,
        meta,
        metadata,
        created_at: row.try_get("created_at").map_err(backend)?,
    })
}

fn creation_error(err: sqlx::Error, slug: &str) -> StoreError {
    let err = DatabaseError::Query(err);
    match err.sql_state().as_deref() {
        Some(UNIQUE_VIOLATION) => StoreError::Duplicate(slug.to_string()),
        Some(FOREIGN_KEY_VIOLATION) => {
            StoreError::Rejected("parent record does not exist".to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
