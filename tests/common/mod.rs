//! In-memory repository doubles and service wiring shared by the
//! integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use seodeck::application::audit::AuditService;
use seodeck::application::principal::{Principal, Role};
use seodeck::application::redirects::{RedirectPolicy, RedirectService};
use seodeck::application::repos::{
    AuditRepo, RedirectPage, RedirectQueryFilter, RedirectsRepo, RepoError, SeoPagesRepo,
    SeoPagesWriteRepo,
};
use seodeck::application::seo::{BulkPolicy, SeoService};
use seodeck::application::sitemap::SitemapService;
use seodeck::cache::{CacheConfig, ListingCache};
use seodeck::domain::catalog::PageCatalog;
use seodeck::domain::entities::{AuditLogRecord, RedirectRecord, SeoPageRecord};

#[derive(Default)]
pub struct InMemoryPages {
    records: Mutex<HashMap<(String, String), SeoPageRecord>>,
}

impl InMemoryPages {
    pub fn record_count(&self, site_id: &str) -> usize {
        self.records
            .lock()
            .expect("pages lock")
            .keys()
            .filter(|(site, _)| site == site_id)
            .count()
    }
}

#[async_trait]
impl SeoPagesRepo for InMemoryPages {
    async fn list_for_site(&self, site_id: &str) -> Result<Vec<SeoPageRecord>, RepoError> {
        let records = self.records.lock().expect("pages lock");
        let mut found: Vec<SeoPageRecord> = records
            .values()
            .filter(|record| record.site_id == site_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    async fn find(&self, site_id: &str, path: &str) -> Result<Option<SeoPageRecord>, RepoError> {
        let records = self.records.lock().expect("pages lock");
        Ok(records
            .get(&(site_id.to_string(), path.to_string()))
            .cloned())
    }

    async fn find_by_slug(
        &self,
        site_id: &str,
        slug: &str,
    ) -> Result<Option<SeoPageRecord>, RepoError> {
        let records = self.records.lock().expect("pages lock");
        Ok(records
            .values()
            .find(|record| record.site_id == site_id && record.slug.as_deref() == Some(slug))
            .cloned())
    }
}

#[async_trait]
impl SeoPagesWriteRepo for InMemoryPages {
    async fn save(&self, record: &SeoPageRecord) -> Result<SeoPageRecord, RepoError> {
        let mut records = self.records.lock().expect("pages lock");
        if let Some(slug) = record.slug.as_deref() {
            let taken = records.values().any(|other| {
                other.site_id == record.site_id
                    && other.path != record.path
                    && other.slug.as_deref() == Some(slug)
            });
            if taken {
                return Err(RepoError::Duplicate {
                    constraint: "seo_pages_site_slug_key".to_string(),
                });
            }
        }
        records.insert(
            (record.site_id.clone(), record.path.clone()),
            record.clone(),
        );
        Ok(record.clone())
    }

    async fn delete(&self, site_id: &str, path: &str) -> Result<bool, RepoError> {
        let mut records = self.records.lock().expect("pages lock");
        Ok(records
            .remove(&(site_id.to_string(), path.to_string()))
            .is_some())
    }
}

#[derive(Default)]
pub struct InMemoryRedirects {
    records: Mutex<Vec<RedirectRecord>>,
}

impl InMemoryRedirects {
    pub fn all(&self, site_id: &str) -> Vec<RedirectRecord> {
        self.records
            .lock()
            .expect("redirects lock")
            .iter()
            .filter(|record| record.site_id == site_id)
            .cloned()
            .collect()
    }

    /// Seed an edge directly, bypassing the safety protocol.
    pub fn seed(&self, site_id: &str, from: &str, to: &str) -> RedirectRecord {
        let record = RedirectRecord {
            id: Uuid::new_v4(),
            site_id: site_id.to_string(),
            from_path: from.to_string(),
            to_path: to.to_string(),
            status: seodeck::domain::types::RedirectStatus::MovedPermanently,
            created_by: "seed".to_string(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        self.records
            .lock()
            .expect("redirects lock")
            .push(record.clone());
        record
    }
}

#[async_trait]
impl RedirectsRepo for InMemoryRedirects {
    async fn find_from(
        &self,
        site_id: &str,
        from_path: &str,
    ) -> Result<Option<RedirectRecord>, RepoError> {
        let records = self.records.lock().expect("redirects lock");
        Ok(records
            .iter()
            .find(|record| record.site_id == site_id && record.from_path == from_path)
            .cloned())
    }

    async fn insert(&self, record: &RedirectRecord) -> Result<RedirectRecord, RepoError> {
        let mut records = self.records.lock().expect("redirects lock");
        let taken = records
            .iter()
            .any(|other| other.site_id == record.site_id && other.from_path == record.from_path);
        if taken {
            return Err(RepoError::Duplicate {
                constraint: "redirects_site_from_path_key".to_string(),
            });
        }
        records.push(record.clone());
        Ok(record.clone())
    }

    async fn list(
        &self,
        site_id: &str,
        filter: &RedirectQueryFilter,
        page: u32,
        limit: u32,
    ) -> Result<RedirectPage, RepoError> {
        let records = self.records.lock().expect("redirects lock");
        let matching: Vec<RedirectRecord> = records
            .iter()
            .filter(|record| {
                if record.site_id != site_id {
                    return false;
                }
                if let Some(search) = filter.search.as_deref() {
                    let term = search.to_lowercase();
                    let hit = record.from_path.to_lowercase().contains(&term)
                        || record.to_path.to_lowercase().contains(&term);
                    if !hit {
                        return false;
                    }
                }
                if let Some(status) = filter.status {
                    if record.status != status {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        let total = matching.len() as u64;
        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();
        Ok(RedirectPage { items, total })
    }

    async fn delete_many(&self, site_id: &str, ids: &[Uuid]) -> Result<u64, RepoError> {
        let mut records = self.records.lock().expect("redirects lock");
        let before = records.len();
        records.retain(|record| record.site_id != site_id || !ids.contains(&record.id));
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryAudit {
    entries: Mutex<Vec<AuditLogRecord>>,
}

impl InMemoryAudit {
    pub fn entries(&self) -> Vec<AuditLogRecord> {
        self.entries.lock().expect("audit lock").clone()
    }
}

#[async_trait]
impl AuditRepo for InMemoryAudit {
    async fn append(&self, entry: AuditLogRecord) -> Result<(), RepoError> {
        self.entries.lock().expect("audit lock").push(entry);
        Ok(())
    }

    async fn list_recent(
        &self,
        site_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogRecord>, RepoError> {
        let entries = self.entries.lock().expect("audit lock");
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.site_id == site_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// An audit sink that always fails, for fire-and-forget coverage.
pub struct BrokenAudit;

#[async_trait]
impl AuditRepo for BrokenAudit {
    async fn append(&self, _entry: AuditLogRecord) -> Result<(), RepoError> {
        Err(RepoError::Timeout)
    }

    async fn list_recent(
        &self,
        _site_id: &str,
        _limit: u32,
    ) -> Result<Vec<AuditLogRecord>, RepoError> {
        Err(RepoError::Timeout)
    }
}

pub struct Harness {
    pub service: SeoService,
    pub redirect_service: RedirectService,
    pub sitemap: SitemapService,
    pub pages: Arc<InMemoryPages>,
    pub redirects: Arc<InMemoryRedirects>,
    pub audit: Arc<InMemoryAudit>,
    pub catalog: Arc<PageCatalog>,
}

pub struct HarnessOptions {
    pub cache: Option<CacheConfig>,
    pub redirect_policy: RedirectPolicy,
    pub bulk_policy: BulkPolicy,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            cache: None,
            redirect_policy: RedirectPolicy::default(),
            bulk_policy: BulkPolicy::default(),
        }
    }
}

pub fn harness() -> Harness {
    harness_with(HarnessOptions::default())
}

pub fn cached_harness() -> Harness {
    harness_with(HarnessOptions {
        cache: Some(CacheConfig::default()),
        ..HarnessOptions::default()
    })
}

pub fn harness_with(options: HarnessOptions) -> Harness {
    let catalog = Arc::new(PageCatalog::standard().expect("standard catalog"));
    let pages = Arc::new(InMemoryPages::default());
    let redirects = Arc::new(InMemoryRedirects::default());
    let audit = Arc::new(InMemoryAudit::default());

    let audit_service = AuditService::new(audit.clone());
    let redirect_service = RedirectService::new(
        redirects.clone(),
        audit_service.clone(),
        options.redirect_policy,
    );
    let cache = options
        .cache
        .as_ref()
        .map(|config| Arc::new(ListingCache::new(config)));
    let service = SeoService::new(
        catalog.clone(),
        pages.clone(),
        pages.clone(),
        redirect_service.clone(),
        audit_service,
        cache,
        options.bulk_policy,
    );
    let sitemap = SitemapService::new(catalog.clone(), pages.clone());

    Harness {
        service,
        redirect_service,
        sitemap,
        pages,
        redirects,
        audit,
        catalog,
    }
}

/// A harness whose audit sink rejects every write.
pub fn harness_with_broken_audit() -> Harness {
    let catalog = Arc::new(PageCatalog::standard().expect("standard catalog"));
    let pages = Arc::new(InMemoryPages::default());
    let redirects = Arc::new(InMemoryRedirects::default());
    let audit = Arc::new(InMemoryAudit::default());

    let audit_service = AuditService::new(Arc::new(BrokenAudit));
    let redirect_service = RedirectService::new(
        redirects.clone(),
        audit_service.clone(),
        RedirectPolicy::default(),
    );
    let service = SeoService::new(
        catalog.clone(),
        pages.clone(),
        pages.clone(),
        redirect_service.clone(),
        audit_service,
        None,
        BulkPolicy::default(),
    );
    let sitemap = SitemapService::new(catalog.clone(), pages.clone());

    Harness {
        service,
        redirect_service,
        sitemap,
        pages,
        redirects,
        audit,
        catalog,
    }
}

pub const SITE: &str = "main";

pub fn admin() -> Principal {
    Principal::new("ada", Role::Admin)
}

pub fn editor() -> Principal {
    Principal::new("erin", Role::Editor)
}

pub fn viewer() -> Principal {
    Principal::new("vic", Role::Viewer)
}
