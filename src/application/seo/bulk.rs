//! Bulk operations over many paths with per-item fault isolation.
//!
//! Path validation is all-or-nothing for update/delete/reset: one path
//! outside the catalog fails the whole call before anything is written.
//! After validation each item is processed independently and a failure is
//! captured in its slot instead of aborting the batch. Import keeps its
//! per-item validation: each supplied item stands or falls alone.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::application::error::SeoError;
use crate::application::monitor::OpTimer;
use crate::application::principal::{Principal, Role, SeoScope};
use crate::domain::entities::AuditLogRecord;
use crate::domain::overlay::{ComposedPage, compose};
use crate::domain::types::{AuditAction, AuditEntityType};

use super::service::SeoService;
use super::types::{BulkFields, UpsertFields};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum BulkRequest {
    Update {
        paths: Vec<String>,
        #[serde(default)]
        fields: BulkFields,
    },
    Delete {
        paths: Vec<String>,
    },
    Reset {
        paths: Vec<String>,
    },
    Export,
    Import {
        items: Vec<ImportItem>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportItem {
    pub path: String,
    #[serde(flatten)]
    pub fields: UpsertFields,
}

#[derive(Debug, Serialize)]
pub struct BulkItemOutcome {
    pub path: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItemOutcome {
    fn ok(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ok: true,
            error: None,
        }
    }

    fn failed(path: impl Into<String>, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            ok: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub operation: &'static str,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BulkItemOutcome>,
    /// Snapshot payload, present for export only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<ComposedPage>>,
}

impl BulkOutcome {
    fn from_items(operation: &'static str, items: Vec<BulkItemOutcome>) -> Self {
        let succeeded = items.iter().filter(|item| item.ok).count();
        Self {
            operation,
            succeeded,
            failed: items.len() - succeeded,
            items,
            pages: None,
        }
    }

    fn affected_paths(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.ok)
            .map(|item| item.path.as_str())
            .collect()
    }
}

impl SeoService {
    /// Apply one bulk operation. Items are processed sequentially so one
    /// failing path never blocks collection of the others' results.
    pub async fn bulk_apply(
        &self,
        site_id: &str,
        request: BulkRequest,
        principal: &Principal,
    ) -> Result<BulkOutcome, SeoError> {
        let _timer = OpTimer::start("seo.bulk_apply");

        match request {
            BulkRequest::Export => self.bulk_export(site_id, principal).await,
            BulkRequest::Update { paths, fields } => {
                self.bulk_update(site_id, paths, fields, principal).await
            }
            BulkRequest::Delete { paths } => {
                self.bulk_remove(site_id, paths, AuditAction::BulkDelete, principal)
                    .await
            }
            BulkRequest::Reset { paths } => {
                self.bulk_remove(site_id, paths, AuditAction::BulkReset, principal)
                    .await
            }
            BulkRequest::Import { items } => self.bulk_import(site_id, items, principal).await,
        }
    }

    /// Snapshot every composed page. No mutation, no audit entry.
    async fn bulk_export(
        &self,
        site_id: &str,
        principal: &Principal,
    ) -> Result<BulkOutcome, SeoError> {
        principal.requires(SeoScope::SeoRead)?;

        let records = self.pages.list_for_site(site_id).await?;
        let pages: Vec<ComposedPage> = self
            .catalog
            .iter()
            .map(|defaults| {
                let record = records.iter().find(|record| record.path == defaults.path);
                compose(defaults, record)
            })
            .collect();

        Ok(BulkOutcome {
            operation: "export",
            succeeded: pages.len(),
            failed: 0,
            items: Vec::new(),
            pages: Some(pages),
        })
    }

    async fn bulk_update(
        &self,
        site_id: &str,
        paths: Vec<String>,
        fields: BulkFields,
        principal: &Principal,
    ) -> Result<BulkOutcome, SeoError> {
        let actor = principal.requires(SeoScope::SeoWrite)?.to_string();
        self.validate_batch(principal, &paths, true)?;

        let upsert = fields.into_upsert();
        let mut items = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.apply_fields(site_id, path, &upsert, &actor).await {
                Ok(_) => items.push(BulkItemOutcome::ok(path)),
                Err(err) => items.push(BulkItemOutcome::failed(path, err)),
            }
        }

        let outcome = BulkOutcome::from_items("update", items);
        self.finish_bulk(site_id, AuditAction::BulkUpdate, &actor, &outcome, false)
            .await;
        Ok(outcome)
    }

    /// Shared body of bulk delete and bulk reset: both drop the override
    /// record; they differ in intent and audit action.
    async fn bulk_remove(
        &self,
        site_id: &str,
        paths: Vec<String>,
        action: AuditAction,
        principal: &Principal,
    ) -> Result<BulkOutcome, SeoError> {
        let actor = principal.requires(SeoScope::SeoDelete)?.to_string();
        self.validate_batch(principal, &paths, true)?;

        let mut items = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.pages_write.delete(site_id, path).await {
                Ok(true) => items.push(BulkItemOutcome::ok(path)),
                Ok(false) => {
                    items.push(BulkItemOutcome::failed(path, "no override record exists"));
                }
                Err(err) => items.push(BulkItemOutcome::failed(path, SeoError::from(err))),
            }
        }

        let operation = match action {
            AuditAction::BulkReset => "reset",
            _ => "delete",
        };
        let outcome = BulkOutcome::from_items(operation, items);
        self.finish_bulk(site_id, action, &actor, &outcome, false).await;
        Ok(outcome)
    }

    /// Re-run the upsert pipeline per supplied item. Unlike update, paths
    /// are validated per item so one bad import row costs only itself.
    async fn bulk_import(
        &self,
        site_id: &str,
        imports: Vec<ImportItem>,
        principal: &Principal,
    ) -> Result<BulkOutcome, SeoError> {
        let actor = principal.requires(SeoScope::SeoWrite)?.to_string();
        let cap = self.bulk_cap(principal);
        if imports.is_empty() {
            return Err(SeoError::validation("no import items supplied"));
        }
        if imports.len() > cap {
            return Err(SeoError::BulkLimitExceeded {
                limit: cap,
                requested: imports.len(),
            });
        }

        let mut items = Vec::with_capacity(imports.len());
        for import in &imports {
            match self
                .apply_fields(site_id, &import.path, &import.fields, &actor)
                .await
            {
                Ok(_) => items.push(BulkItemOutcome::ok(&import.path)),
                Err(err) => items.push(BulkItemOutcome::failed(&import.path, err)),
            }
        }

        let outcome = BulkOutcome::from_items("import", items);
        self.finish_bulk(site_id, AuditAction::BulkUpdate, &actor, &outcome, true)
            .await;
        Ok(outcome)
    }

    /// Cap, emptiness, and (optionally) all-or-nothing catalog validation.
    fn validate_batch(
        &self,
        principal: &Principal,
        paths: &[String],
        require_known_paths: bool,
    ) -> Result<(), SeoError> {
        if paths.is_empty() {
            return Err(SeoError::validation("no paths supplied"));
        }
        let cap = self.bulk_cap(principal);
        if paths.len() > cap {
            return Err(SeoError::BulkLimitExceeded {
                limit: cap,
                requested: paths.len(),
            });
        }
        if require_known_paths {
            for path in paths {
                if !self.catalog.contains(path) {
                    return Err(SeoError::invalid_path(path));
                }
            }
        }
        Ok(())
    }

    fn bulk_cap(&self, principal: &Principal) -> usize {
        match principal.role() {
            Role::Admin => self.bulk.admin_limit,
            _ => self.bulk.editor_limit,
        }
    }

    /// One cache invalidation and one audit entry per bulk call.
    async fn finish_bulk(
        &self,
        site_id: &str,
        action: AuditAction,
        actor: &str,
        outcome: &BulkOutcome,
        import: bool,
    ) {
        self.invalidate(site_id);

        let affected = outcome.affected_paths();
        let entry = AuditLogRecord::new(action, AuditEntityType::SeoPage, site_id, "*", actor)
            .with_metadata(json!({
                "bulk": true,
                "import": import,
                "requested": outcome.items.len(),
                "affected": affected,
            }));
        self.audit.record(entry).await;

        info!(
            site_id,
            operation = outcome.operation,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "bulk operation finished"
        );
    }
}
