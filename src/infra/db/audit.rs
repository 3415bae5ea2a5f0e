use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{AuditRepo, RepoError},
    domain::entities::{AuditLogRecord, FieldChange},
    domain::types::{AuditAction, AuditEntityType},
};

use super::{PostgresRepositories, map_sqlx_error};

const AUDIT_COLUMNS: &str = "id, action, entity_type, site_id, path, old_slug, new_slug, \
     changes, metadata, performed_by, performed_at";

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    action: String,
    entity_type: String,
    site_id: String,
    path: String,
    old_slug: Option<String>,
    new_slug: Option<String>,
    changes: Json<Vec<FieldChange>>,
    metadata: Json<serde_json::Value>,
    performed_by: String,
    performed_at: OffsetDateTime,
}

impl TryFrom<AuditRow> for AuditLogRecord {
    type Error = RepoError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = AuditAction::try_from(row.action.as_str()).map_err(|_| {
            RepoError::Integrity {
                message: format!("unknown audit action `{}`", row.action),
            }
        })?;
        let entity_type = AuditEntityType::try_from(row.entity_type.as_str()).map_err(|_| {
            RepoError::Integrity {
                message: format!("unknown audit entity type `{}`", row.entity_type),
            }
        })?;
        Ok(Self {
            id: row.id,
            action,
            entity_type,
            site_id: row.site_id,
            path: row.path,
            old_slug: row.old_slug,
            new_slug: row.new_slug,
            changes: row.changes.0,
            metadata: row.metadata.0,
            performed_by: row.performed_by,
            performed_at: row.performed_at,
        })
    }
}

#[async_trait]
impl AuditRepo for PostgresRepositories {
    async fn append(&self, entry: AuditLogRecord) -> Result<(), RepoError> {
        sqlx::query(&format!(
            "INSERT INTO audit_logs ({AUDIT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(entry.id)
        .bind(entry.action.as_str())
        .bind(entry.entity_type.as_str())
        .bind(&entry.site_id)
        .bind(&entry.path)
        .bind(&entry.old_slug)
        .bind(&entry.new_slug)
        .bind(Json(&entry.changes))
        .bind(Json(&entry.metadata))
        .bind(&entry.performed_by)
        .bind(entry.performed_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_recent(
        &self,
        site_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogRecord>, RepoError> {
        let rows = sqlx::query_as::<_, AuditRow>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE site_id = $1 \
             ORDER BY performed_at DESC, id DESC LIMIT $2"
        ))
        .bind(site_id)
        .bind(limit.clamp(1, 200) as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(AuditLogRecord::try_from).collect()
    }
}
