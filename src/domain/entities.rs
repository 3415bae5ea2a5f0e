//! Persisted record types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{AuditAction, AuditEntityType, PageCategory, RedirectStatus};

/// Open Graph overrides for a page. Every field is optional; unset fields
/// fall back to the composed title and description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub og_type: Option<String>,
}

impl OpenGraph {
    pub fn is_unset(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.og_type.is_none()
    }
}

/// Mutable per-page override, keyed by `(site_id, path)`.
///
/// Every override field is optional: `None` means "use the catalog
/// default". A record only exists once something was customized, so its
/// absence is itself a meaningful state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoPageRecord {
    pub id: Uuid,
    pub site_id: String,
    pub path: String,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub robots: Option<String>,
    pub category: Option<PageCategory>,
    pub open_graph: OpenGraph,
    pub is_custom: bool,
    pub created_by: String,
    pub updated_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A stored redirect edge. Redirects are created and deleted, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectRecord {
    pub id: Uuid,
    pub site_id: String,
    pub from_path: String,
    pub to_path: String,
    pub status: RedirectStatus,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One field-level difference recorded in an audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

/// Append-only audit entry. Written once, never updated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogRecord {
    pub id: Uuid,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub site_id: String,
    pub path: String,
    pub old_slug: Option<String>,
    pub new_slug: Option<String>,
    pub changes: Vec<FieldChange>,
    pub metadata: serde_json::Value,
    pub performed_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
}

impl AuditLogRecord {
    pub fn new(
        action: AuditAction,
        entity_type: AuditEntityType,
        site_id: impl Into<String>,
        path: impl Into<String>,
        performed_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            entity_type,
            site_id: site_id.into(),
            path: path.into(),
            old_slug: None,
            new_slug: None,
            changes: Vec::new(),
            metadata: serde_json::Value::Null,
            performed_by: performed_by.into(),
            performed_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_slug_change(
        mut self,
        old_slug: impl Into<String>,
        new_slug: impl Into<String>,
    ) -> Self {
        self.old_slug = Some(old_slug.into());
        self.new_slug = Some(new_slug.into());
        self
    }

    pub fn with_changes(mut self, changes: Vec<FieldChange>) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
