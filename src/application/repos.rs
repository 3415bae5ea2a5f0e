//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{AuditLogRecord, RedirectRecord, SeoPageRecord};
use crate::domain::types::RedirectStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedirectQueryFilter {
    /// Case-insensitive substring match against source and destination.
    pub search: Option<String>,
    pub status: Option<RedirectStatus>,
}

/// One page of redirects plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct RedirectPage {
    pub items: Vec<RedirectRecord>,
    pub total: u64,
}

/// Read access to SEO override records.
#[async_trait]
pub trait SeoPagesRepo: Send + Sync {
    async fn list_for_site(&self, site_id: &str) -> Result<Vec<SeoPageRecord>, RepoError>;

    async fn find(&self, site_id: &str, path: &str) -> Result<Option<SeoPageRecord>, RepoError>;

    /// Lookup by claimed slug. Used as the fast-path uniqueness pre-check;
    /// the store's unique index remains the real guarantee.
    async fn find_by_slug(
        &self,
        site_id: &str,
        slug: &str,
    ) -> Result<Option<SeoPageRecord>, RepoError>;
}

/// Write access to SEO override records.
#[async_trait]
pub trait SeoPagesWriteRepo: Send + Sync {
    /// Insert or update the record for `(site_id, path)`. A slug collision
    /// with another path must surface as [`RepoError::Duplicate`] with the
    /// slug constraint name.
    async fn save(&self, record: &SeoPageRecord) -> Result<SeoPageRecord, RepoError>;

    /// Delete the override for a path. Returns `false` when no record
    /// existed.
    async fn delete(&self, site_id: &str, path: &str) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait RedirectsRepo: Send + Sync {
    /// The at-most-one outgoing redirect for a source path.
    async fn find_from(
        &self,
        site_id: &str,
        from_path: &str,
    ) -> Result<Option<RedirectRecord>, RepoError>;

    /// Insert a redirect. A second redirect from the same source must
    /// surface as [`RepoError::Duplicate`].
    async fn insert(&self, record: &RedirectRecord) -> Result<RedirectRecord, RepoError>;

    async fn list(
        &self,
        site_id: &str,
        filter: &RedirectQueryFilter,
        page: u32,
        limit: u32,
    ) -> Result<RedirectPage, RepoError>;

    /// Delete redirects by id, returning how many rows went away.
    async fn delete_many(&self, site_id: &str, ids: &[Uuid]) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait AuditRepo: Send + Sync {
    async fn append(&self, entry: AuditLogRecord) -> Result<(), RepoError>;

    async fn list_recent(
        &self,
        site_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogRecord>, RepoError>;
}
