//! Audit emission and read access.
//!
//! Audit writes are fire-and-forget: a failing audit sink must never fail
//! the operation that produced the entry, so failures are downgraded to a
//! warning here instead of propagating.

use std::sync::Arc;

use tracing::warn;

use crate::domain::entities::AuditLogRecord;

use super::repos::{AuditRepo, RepoError};

#[derive(Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditRepo>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepo>) -> Self {
        Self { repo }
    }

    /// Append an entry, swallowing sink failures.
    pub async fn record(&self, entry: AuditLogRecord) {
        let action = entry.action;
        let path = entry.path.clone();
        if let Err(err) = self.repo.append(entry).await {
            warn!(
                error = %err,
                action = action.as_str(),
                path = %path,
                "audit entry dropped"
            );
        }
    }

    pub async fn list_recent(
        &self,
        site_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogRecord>, RepoError> {
        self.repo.list_recent(site_id, limit.clamp(1, 200)).await
    }
}
