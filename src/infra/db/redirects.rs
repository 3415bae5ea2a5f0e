use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{RedirectPage, RedirectQueryFilter, RedirectsRepo, RepoError},
    domain::entities::RedirectRecord,
    domain::types::RedirectStatus,
};

use super::{PostgresRepositories, map_sqlx_error};

const REDIRECT_COLUMNS: &str = "id, site_id, from_path, to_path, status, created_by, created_at";

#[derive(sqlx::FromRow)]
struct RedirectRow {
    id: Uuid,
    site_id: String,
    from_path: String,
    to_path: String,
    status: i16,
    created_by: String,
    created_at: OffsetDateTime,
}

impl TryFrom<RedirectRow> for RedirectRecord {
    type Error = RepoError;

    fn try_from(row: RedirectRow) -> Result<Self, Self::Error> {
        let code = u16::try_from(row.status).map_err(|_| RepoError::Integrity {
            message: format!("redirect status `{}` out of range", row.status),
        })?;
        let status = RedirectStatus::try_from(code)
            .map_err(|message| RepoError::Integrity { message })?;
        Ok(Self {
            id: row.id,
            site_id: row.site_id,
            from_path: row.from_path,
            to_path: row.to_path,
            status,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

fn apply_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q RedirectQueryFilter) {
    if let Some(search) = filter.search.as_ref() {
        let pattern = format!("%{search}%");
        qb.push(" AND (from_path ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR to_path ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status.code() as i16);
    }
}

#[async_trait]
impl RedirectsRepo for PostgresRepositories {
    async fn find_from(
        &self,
        site_id: &str,
        from_path: &str,
    ) -> Result<Option<RedirectRecord>, RepoError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {REDIRECT_COLUMNS} FROM redirects WHERE site_id = $1 AND from_path = $2"
        ))
        .bind(site_id)
        .bind(from_path)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(RedirectRecord::try_from).transpose()
    }

    async fn insert(&self, record: &RedirectRecord) -> Result<RedirectRecord, RepoError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "INSERT INTO redirects ({REDIRECT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {REDIRECT_COLUMNS}"
        ))
        .bind(record.id)
        .bind(&record.site_id)
        .bind(&record.from_path)
        .bind(&record.to_path)
        .bind(record.status.code() as i16)
        .bind(&record.created_by)
        .bind(record.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        RedirectRecord::try_from(row)
    }

    async fn list(
        &self,
        site_id: &str,
        filter: &RedirectQueryFilter,
        page: u32,
        limit: u32,
    ) -> Result<RedirectPage, RepoError> {
        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM redirects WHERE site_id = ");
        count_qb.push_bind(site_id);
        apply_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {REDIRECT_COLUMNS} FROM redirects WHERE site_id = "
        ));
        qb.push_bind(site_id);
        apply_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit as i64);
        qb.push(" OFFSET ");
        qb.push_bind((page.saturating_sub(1) as i64) * limit as i64);

        let rows: Vec<RedirectRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(RedirectRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RedirectPage {
            items,
            total: Self::convert_count(total)?,
        })
    }

    async fn delete_many(&self, site_id: &str, ids: &[Uuid]) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM redirects WHERE site_id = $1 AND id = ANY($2)")
            .bind(site_id)
            .bind(ids)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
