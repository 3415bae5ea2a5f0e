use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{RepoError, SeoPagesRepo, SeoPagesWriteRepo},
    domain::entities::{OpenGraph, SeoPageRecord},
    domain::types::PageCategory,
};

use super::{PostgresRepositories, map_sqlx_error};

const SEO_PAGE_COLUMNS: &str = "id, site_id, path, slug, meta_title, meta_description, robots, \
     category, open_graph, is_custom, created_by, updated_by, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct SeoPageRow {
    id: Uuid,
    site_id: String,
    path: String,
    slug: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    robots: Option<String>,
    category: Option<PageCategory>,
    open_graph: Json<OpenGraph>,
    is_custom: bool,
    created_by: String,
    updated_by: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<SeoPageRow> for SeoPageRecord {
    fn from(row: SeoPageRow) -> Self {
        Self {
            id: row.id,
            site_id: row.site_id,
            path: row.path,
            slug: row.slug,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            robots: row.robots,
            category: row.category,
            open_graph: row.open_graph.0,
            is_custom: row.is_custom,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SeoPagesRepo for PostgresRepositories {
    async fn list_for_site(&self, site_id: &str) -> Result<Vec<SeoPageRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SeoPageRow>(&format!(
            "SELECT {SEO_PAGE_COLUMNS} FROM seo_pages WHERE site_id = $1 ORDER BY path"
        ))
        .bind(site_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SeoPageRecord::from).collect())
    }

    async fn find(&self, site_id: &str, path: &str) -> Result<Option<SeoPageRecord>, RepoError> {
        let row = sqlx::query_as::<_, SeoPageRow>(&format!(
            "SELECT {SEO_PAGE_COLUMNS} FROM seo_pages WHERE site_id = $1 AND path = $2"
        ))
        .bind(site_id)
        .bind(path)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SeoPageRecord::from))
    }

    async fn find_by_slug(
        &self,
        site_id: &str,
        slug: &str,
    ) -> Result<Option<SeoPageRecord>, RepoError> {
        let row = sqlx::query_as::<_, SeoPageRow>(&format!(
            "SELECT {SEO_PAGE_COLUMNS} FROM seo_pages WHERE site_id = $1 AND slug = $2"
        ))
        .bind(site_id)
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SeoPageRecord::from))
    }
}

#[async_trait]
impl SeoPagesWriteRepo for PostgresRepositories {
    async fn save(&self, record: &SeoPageRecord) -> Result<SeoPageRecord, RepoError> {
        // The partial unique index on (site_id, slug) makes a concurrent
        // slug claim surface as a duplicate-key error here.
        let row = sqlx::query_as::<_, SeoPageRow>(&format!(
            "INSERT INTO seo_pages ({SEO_PAGE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (site_id, path) DO UPDATE SET \
                 slug = EXCLUDED.slug, \
                 meta_title = EXCLUDED.meta_title, \
                 meta_description = EXCLUDED.meta_description, \
                 robots = EXCLUDED.robots, \
                 category = EXCLUDED.category, \
                 open_graph = EXCLUDED.open_graph, \
                 is_custom = EXCLUDED.is_custom, \
                 updated_by = EXCLUDED.updated_by, \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {SEO_PAGE_COLUMNS}"
        ))
        .bind(record.id)
        .bind(&record.site_id)
        .bind(&record.path)
        .bind(&record.slug)
        .bind(&record.meta_title)
        .bind(&record.meta_description)
        .bind(&record.robots)
        .bind(record.category)
        .bind(Json(&record.open_graph))
        .bind(record.is_custom)
        .bind(&record.created_by)
        .bind(&record.updated_by)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(SeoPageRecord::from(row))
    }

    async fn delete(&self, site_id: &str, path: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM seo_pages WHERE site_id = $1 AND path = $2")
            .bind(site_id)
            .bind(path)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
