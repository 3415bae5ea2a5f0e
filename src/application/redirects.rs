//! Redirect management and the redirect safety protocol.
//!
//! Adding a redirect edge must never close a cycle and must never grow a
//! chain past the configured maximum. The chain walk completes before any
//! state is written and is bounded by the depth check, so it terminates
//! even when stored data already contains a cycle.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{AuditLogRecord, RedirectRecord};
use crate::domain::types::{AuditAction, AuditEntityType, RedirectStatus};

use super::audit::AuditService;
use super::error::SeoError;
use super::monitor::OpTimer;
use super::principal::{Principal, SeoScope};
use super::repos::{RedirectPage, RedirectQueryFilter, RedirectsRepo, RepoError};

/// Why a redirect was refused. Carried as data, not as an error, so a
/// surrounding slug change can report it without failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RedirectDenial {
    /// Following the destination chain leads back to the source.
    Loop { via: Vec<String> },
    /// The resulting chain from the source would reach the maximum.
    ChainTooLong { depth: usize, max: usize },
    /// The source already has an outgoing redirect.
    AlreadyExists { from: String },
}

impl fmt::Display for RedirectDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectDenial::Loop { via } => {
                write!(f, "redirect would create a loop via {}", via.join(" -> "))
            }
            RedirectDenial::ChainTooLong { depth, max } => {
                write!(f, "redirect chain would reach depth {depth} (max {max})")
            }
            RedirectDenial::AlreadyExists { from } => {
                write!(f, "a redirect from `{from}` already exists")
            }
        }
    }
}

/// Outcome of a safe-create attempt.
#[derive(Debug)]
pub enum RedirectAttempt {
    Created(RedirectRecord),
    Denied(RedirectDenial),
}

impl RedirectAttempt {
    pub fn created(&self) -> bool {
        matches!(self, RedirectAttempt::Created(_))
    }
}

/// Chain and deletion limits, sourced from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RedirectPolicy {
    /// A chain reaching this depth is rejected (`>=` comparison).
    pub max_chain: usize,
    /// Hard cap on ids per delete-many call.
    pub delete_cap: usize,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            max_chain: 5,
            delete_cap: 50,
        }
    }
}

#[derive(Clone)]
pub struct RedirectService {
    redirects: Arc<dyn RedirectsRepo>,
    audit: AuditService,
    policy: RedirectPolicy,
}

impl RedirectService {
    pub fn new(
        redirects: Arc<dyn RedirectsRepo>,
        audit: AuditService,
        policy: RedirectPolicy,
    ) -> Self {
        Self {
            redirects,
            audit,
            policy,
        }
    }

    /// Create a redirect after the full safety check; persists nothing when
    /// the check fails and reports the denial as data.
    pub async fn create_redirect_safely(
        &self,
        site_id: &str,
        from: &str,
        to: &str,
        status: RedirectStatus,
        principal: &Principal,
    ) -> Result<RedirectAttempt, SeoError> {
        let actor = principal.requires(SeoScope::SeoWrite)?.to_string();
        Ok(self.attempt(site_id, from, to, status, &actor).await?)
    }

    /// The safety protocol proper, shared with the slug-change path.
    pub(crate) async fn attempt(
        &self,
        site_id: &str,
        from: &str,
        to: &str,
        status: RedirectStatus,
        actor: &str,
    ) -> Result<RedirectAttempt, RepoError> {
        let _timer = OpTimer::start("redirects.create_safely");

        if from == to {
            return Ok(RedirectAttempt::Denied(RedirectDenial::Loop {
                via: vec![from.to_string()],
            }));
        }

        // Walk the chain starting at the new destination. `depth` counts
        // hops from `from`, the new edge included, and bounds the walk so
        // it terminates even over a pre-existing stored cycle.
        let mut via = vec![to.to_string()];
        let mut depth = 1usize;
        let mut cursor = to.to_string();
        loop {
            if depth >= self.policy.max_chain {
                return Ok(RedirectAttempt::Denied(RedirectDenial::ChainTooLong {
                    depth,
                    max: self.policy.max_chain,
                }));
            }
            match self.redirects.find_from(site_id, &cursor).await? {
                None => break,
                Some(next) => {
                    if next.to_path == from {
                        return Ok(RedirectAttempt::Denied(RedirectDenial::Loop { via }));
                    }
                    depth += 1;
                    via.push(next.to_path.clone());
                    cursor = next.to_path;
                }
            }
        }

        if self.redirects.find_from(site_id, from).await?.is_some() {
            return Ok(RedirectAttempt::Denied(RedirectDenial::AlreadyExists {
                from: from.to_string(),
            }));
        }

        let record = RedirectRecord {
            id: Uuid::new_v4(),
            site_id: site_id.to_string(),
            from_path: from.to_string(),
            to_path: to.to_string(),
            status,
            created_by: actor.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let saved = match self.redirects.insert(&record).await {
            Ok(saved) => saved,
            // A concurrent writer claimed the source between the check and
            // the insert; the unique index is the backstop.
            Err(RepoError::Duplicate { .. }) => {
                return Ok(RedirectAttempt::Denied(RedirectDenial::AlreadyExists {
                    from: from.to_string(),
                }));
            }
            Err(err) => return Err(err),
        };

        self.audit
            .record(
                AuditLogRecord::new(
                    AuditAction::RedirectCreate,
                    AuditEntityType::Redirect,
                    site_id,
                    from,
                    actor,
                )
                .with_metadata(json!({
                    "to": saved.to_path,
                    "status": saved.status.code(),
                })),
            )
            .await;

        info!(
            site_id,
            from,
            to = %saved.to_path,
            status = saved.status.code(),
            "redirect created"
        );
        Ok(RedirectAttempt::Created(saved))
    }

    pub async fn list_redirects(
        &self,
        site_id: &str,
        filter: &RedirectQueryFilter,
        page: u32,
        limit: u32,
        principal: &Principal,
    ) -> Result<RedirectPage, SeoError> {
        principal.requires(SeoScope::SeoRead)?;
        if page < 1 {
            return Err(SeoError::validation("page must be >= 1"));
        }
        let limit = limit.clamp(1, 100);
        Ok(self.redirects.list(site_id, filter, page, limit).await?)
    }

    /// Delete redirects by id, bounded by the configured hard cap.
    pub async fn delete_redirects(
        &self,
        site_id: &str,
        ids: &[Uuid],
        principal: &Principal,
    ) -> Result<u64, SeoError> {
        let actor = principal.requires(SeoScope::SeoDelete)?;
        if ids.is_empty() {
            return Err(SeoError::validation("no redirect ids supplied"));
        }
        if ids.len() > self.policy.delete_cap {
            return Err(SeoError::BulkLimitExceeded {
                limit: self.policy.delete_cap,
                requested: ids.len(),
            });
        }
        let deleted = self.redirects.delete_many(site_id, ids).await?;
        info!(site_id, deleted, actor, "redirects deleted");
        Ok(deleted)
    }
}
