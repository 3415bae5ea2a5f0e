//! The page metadata service: listings, reads, and single-page writes.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::application::audit::AuditService;
use crate::application::error::SeoError;
use crate::application::monitor::OpTimer;
use crate::application::principal::{Principal, SeoScope};
use crate::application::redirects::{RedirectAttempt, RedirectDenial, RedirectService};
use crate::application::repos::{RepoError, SeoPagesRepo, SeoPagesWriteRepo};
use crate::cache::{ListingCache, listing_fingerprint};
use crate::domain::catalog::PageCatalog;
use crate::domain::entities::{AuditLogRecord, FieldChange, SeoPageRecord};
use crate::domain::overlay::{ComposedPage, compose, effective_slug};
use crate::domain::security::{FieldThreat, scan_fields, scan_path};
use crate::domain::types::{AuditAction, AuditEntityType, RedirectStatus};

use super::types::{
    BulkPolicy, ListPagesQuery, ListingSummary, MAX_PAGE_LIMIT, PageListing, UpsertFields,
    UpsertOutcome,
};

/// Everything `apply_fields` produced, so callers can report and audit
/// without re-reading the store.
pub(super) struct AppliedUpsert {
    pub composed: ComposedPage,
    pub created: bool,
    pub old_slug: String,
    pub new_slug: String,
    pub changes: Vec<FieldChange>,
}

#[derive(Clone)]
pub struct SeoService {
    pub(super) catalog: Arc<PageCatalog>,
    pub(super) pages: Arc<dyn SeoPagesRepo>,
    pub(super) pages_write: Arc<dyn SeoPagesWriteRepo>,
    pub(super) redirects: RedirectService,
    pub(super) audit: AuditService,
    pub(super) cache: Option<Arc<ListingCache>>,
    pub(super) bulk: BulkPolicy,
}

impl SeoService {
    pub fn new(
        catalog: Arc<PageCatalog>,
        pages: Arc<dyn SeoPagesRepo>,
        pages_write: Arc<dyn SeoPagesWriteRepo>,
        redirects: RedirectService,
        audit: AuditService,
        cache: Option<Arc<ListingCache>>,
        bulk: BulkPolicy,
    ) -> Self {
        Self {
            catalog,
            pages,
            pages_write,
            redirects,
            audit,
            cache,
            bulk,
        }
    }

    /// List composed pages for a site with filtering and pagination. Reads
    /// go through the TTL cache unless the query opts out.
    pub async fn list_pages(
        &self,
        site_id: &str,
        query: &ListPagesQuery,
        principal: &Principal,
    ) -> Result<PageListing, SeoError> {
        principal.requires(SeoScope::SeoRead)?;
        let _timer = OpTimer::start("seo.list_pages");

        if query.page < 1 {
            return Err(SeoError::validation("page must be >= 1"));
        }
        let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);

        let fingerprint = listing_fingerprint(query);
        if !query.bypass_cache {
            if let Some(cache) = &self.cache {
                if let Some(hit) = cache.get(site_id, fingerprint) {
                    return Ok(hit);
                }
            }
        }

        let records = self.pages.list_for_site(site_id).await?;
        let by_path: HashMap<&str, &SeoPageRecord> = records
            .iter()
            .map(|record| (record.path.as_str(), record))
            .collect();

        let composed: Vec<ComposedPage> = self
            .catalog
            .iter()
            .map(|defaults| compose(defaults, by_path.get(defaults.path.as_str()).copied()))
            .collect();

        // The summary counts the whole site, not the filtered view.
        let custom = composed.iter().filter(|page| page.is_custom).count() as u64;
        let summary = ListingSummary {
            total_pages: composed.len() as u64,
            custom,
            default: composed.len() as u64 - custom,
        };

        let search = query.normalized_search();
        let filtered: Vec<ComposedPage> = composed
            .into_iter()
            .filter(|page| {
                if let Some(category) = query.category {
                    if page.category != category {
                        return false;
                    }
                }
                if let Some(is_custom) = query.is_custom {
                    if page.is_custom != is_custom {
                        return false;
                    }
                }
                if let Some(term) = &search {
                    let matches = page.path.to_lowercase().contains(term)
                        || page.slug.to_lowercase().contains(term)
                        || page.meta_title.to_lowercase().contains(term)
                        || page.meta_description.to_lowercase().contains(term);
                    if !matches {
                        return false;
                    }
                }
                true
            })
            .collect();

        let total = filtered.len() as u64;
        let offset = (query.page as usize - 1).saturating_mul(limit as usize);
        let items: Vec<ComposedPage> = filtered
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();

        let listing = PageListing {
            items,
            total,
            page: query.page,
            limit,
            summary,
        };
        if let Some(cache) = &self.cache {
            cache.put(site_id, fingerprint, listing.clone());
        }
        Ok(listing)
    }

    /// The fully-composed view of one page.
    pub async fn get_page(
        &self,
        site_id: &str,
        path: &str,
        principal: &Principal,
    ) -> Result<ComposedPage, SeoError> {
        principal.requires(SeoScope::SeoRead)?;
        let _timer = OpTimer::start("seo.get_page");

        let defaults = self
            .catalog
            .get(path)
            .ok_or_else(|| SeoError::invalid_path(path))?;
        let record = self.pages.find(site_id, path).await?;
        Ok(compose(defaults, record.as_ref()))
    }

    /// Create or update the override record for one path. A slug change on
    /// an existing record triggers a redirect attempt whose failure is
    /// reported, never fatal.
    pub async fn upsert_page(
        &self,
        site_id: &str,
        path: &str,
        fields: UpsertFields,
        principal: &Principal,
    ) -> Result<UpsertOutcome, SeoError> {
        let actor = principal.requires(SeoScope::SeoWrite)?.to_string();
        let _timer = OpTimer::start("seo.upsert_page");

        let applied = self.apply_fields(site_id, path, &fields, &actor).await?;
        let slug_changed = applied.old_slug != applied.new_slug;

        // A redirect only makes sense when an existing record moved; a
        // freshly created override has no published slug to redirect from.
        let mut redirect_created = false;
        let mut redirect_denied: Option<RedirectDenial> = None;
        if !applied.created && slug_changed && fields.create_redirect() {
            let from = slug_url(&applied.old_slug);
            let to = slug_url(&applied.new_slug);
            match self
                .redirects
                .attempt(site_id, &from, &to, RedirectStatus::MovedPermanently, &actor)
                .await
            {
                Ok(RedirectAttempt::Created(_)) => redirect_created = true,
                Ok(RedirectAttempt::Denied(denial)) => {
                    warn!(site_id, path, %denial, "redirect refused after slug change");
                    redirect_denied = Some(denial);
                }
                // The page write already stands; a store failure here only
                // costs the redirect.
                Err(err) => {
                    warn!(site_id, path, error = %err, "redirect creation failed after slug change");
                }
            }
        }

        self.invalidate(site_id);

        let action = if applied.created {
            AuditAction::Create
        } else if slug_changed {
            AuditAction::SlugChange
        } else {
            AuditAction::Update
        };
        let mut entry = AuditLogRecord::new(action, AuditEntityType::SeoPage, site_id, path, &actor)
            .with_changes(applied.changes);
        if slug_changed {
            entry = entry
                .with_slug_change(&applied.old_slug, &applied.new_slug)
                .with_metadata(json!({ "redirect_created": redirect_created }));
        }
        self.audit.record(entry).await;

        Ok(UpsertOutcome {
            page: applied.composed,
            created: applied.created,
            slug_changed,
            redirect_created,
            redirect_denied,
        })
    }

    /// Delete the override for a path and return the defaults now in
    /// effect. Fails with `NotFound` when there is nothing to reset.
    pub async fn reset_page(
        &self,
        site_id: &str,
        path: &str,
        principal: &Principal,
    ) -> Result<ComposedPage, SeoError> {
        let actor = principal.requires(SeoScope::SeoDelete)?.to_string();
        let _timer = OpTimer::start("seo.reset_page");

        let defaults = self
            .catalog
            .get(path)
            .ok_or_else(|| SeoError::invalid_path(path))?;
        let removed = self.pages_write.delete(site_id, path).await?;
        if !removed {
            return Err(SeoError::not_found(path));
        }

        self.invalidate(site_id);
        self.audit
            .record(AuditLogRecord::new(
                AuditAction::Reset,
                AuditEntityType::SeoPage,
                site_id,
                path,
                &actor,
            ))
            .await;

        Ok(compose(defaults, None))
    }

    /// Validate and persist one path's fields. Shared between the single
    /// upsert and the bulk update/import paths; emits no audit entries and
    /// touches no cache.
    pub(super) async fn apply_fields(
        &self,
        site_id: &str,
        path: &str,
        fields: &UpsertFields,
        actor: &str,
    ) -> Result<AppliedUpsert, SeoError> {
        let defaults = self
            .catalog
            .get(path)
            .ok_or_else(|| SeoError::invalid_path(path))?;

        let threats = scan_upsert(fields);
        if !threats.is_empty() {
            return Err(SeoError::SecurityValidationFailed { threats });
        }

        let normalized_slug = match fields.slug.as_deref() {
            Some(raw) => {
                let normalized = slug::slugify(raw);
                if normalized.is_empty() {
                    return Err(SeoError::validation(
                        "slug must contain at least one alphanumeric character",
                    ));
                }
                self.check_slug_available(site_id, path, &normalized).await?;
                Some(normalized)
            }
            None => None,
        };

        let existing = self.pages.find(site_id, path).await?;
        let old_slug = effective_slug(defaults, existing.as_ref());
        let before = compose(defaults, existing.as_ref());
        let created = existing.is_none();

        let now = OffsetDateTime::now_utc();
        let record = match existing {
            Some(mut record) => {
                if let Some(slug) = normalized_slug {
                    record.slug = Some(slug);
                }
                if let Some(value) = fields.meta_title.clone() {
                    record.meta_title = Some(value);
                }
                if let Some(value) = fields.meta_description.clone() {
                    record.meta_description = Some(value);
                }
                if let Some(value) = fields.robots.clone() {
                    record.robots = Some(value);
                }
                if let Some(value) = fields.category {
                    record.category = Some(value);
                }
                if let Some(open_graph) = fields.open_graph.clone() {
                    record.open_graph = open_graph;
                }
                record.is_custom = true;
                record.updated_by = actor.to_string();
                record.updated_at = now;
                record
            }
            None => SeoPageRecord {
                id: Uuid::new_v4(),
                site_id: site_id.to_string(),
                path: path.to_string(),
                slug: normalized_slug,
                meta_title: fields.meta_title.clone(),
                meta_description: fields.meta_description.clone(),
                robots: fields.robots.clone(),
                category: fields.category,
                open_graph: fields.open_graph.clone().unwrap_or_default(),
                is_custom: true,
                created_by: actor.to_string(),
                updated_by: actor.to_string(),
                created_at: now,
                updated_at: now,
            },
        };

        let saved = match self.pages_write.save(&record).await {
            Ok(saved) => saved,
            // Unique index caught a slug race the pre-check missed.
            Err(RepoError::Duplicate { constraint }) if constraint.contains("slug") => {
                return Err(SeoError::SlugConflict {
                    slug: record.slug.unwrap_or(old_slug),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let new_slug = effective_slug(defaults, Some(&saved));
        let composed = compose(defaults, Some(&saved));
        let changes = diff_changes(&before, &composed);

        Ok(AppliedUpsert {
            composed,
            created,
            old_slug,
            new_slug,
            changes,
        })
    }

    /// Slug uniqueness pre-check: a claimed slug may collide with another
    /// record's override or with another catalog page still on its default.
    /// The caller's own page is exempt.
    async fn check_slug_available(
        &self,
        site_id: &str,
        path: &str,
        slug: &str,
    ) -> Result<(), SeoError> {
        if let Some(holder) = self.pages.find_by_slug(site_id, slug).await? {
            if holder.path != path {
                return Err(SeoError::SlugConflict {
                    slug: slug.to_string(),
                });
            }
        }

        let default_holder = self
            .catalog
            .iter()
            .find(|entry| entry.default_slug == slug && entry.path != path);
        if let Some(holder) = default_holder {
            // Only a conflict while that page actually serves its default.
            let record = self.pages.find(site_id, &holder.path).await?;
            let overridden = record.as_ref().is_some_and(|record| record.slug.is_some());
            if !overridden {
                return Err(SeoError::SlugConflict {
                    slug: slug.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Synchronous invalidation; writes must not return before this runs.
    pub(super) fn invalidate(&self, site_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_site(site_id);
        }
    }
}

fn slug_url(slug: &str) -> String {
    format!("/{slug}")
}

fn scan_upsert(fields: &UpsertFields) -> Vec<FieldThreat> {
    let mut targets: Vec<(&'static str, &str)> = Vec::new();
    if let Some(value) = fields.meta_title.as_deref() {
        targets.push(("meta_title", value));
    }
    if let Some(value) = fields.meta_description.as_deref() {
        targets.push(("meta_description", value));
    }
    if let Some(value) = fields.robots.as_deref() {
        targets.push(("robots", value));
    }
    if let Some(open_graph) = &fields.open_graph {
        if let Some(value) = open_graph.title.as_deref() {
            targets.push(("open_graph.title", value));
        }
        if let Some(value) = open_graph.description.as_deref() {
            targets.push(("open_graph.description", value));
        }
        if let Some(value) = open_graph.image.as_deref() {
            targets.push(("open_graph.image", value));
        }
        if let Some(value) = open_graph.og_type.as_deref() {
            targets.push(("open_graph.type", value));
        }
    }
    let mut threats = scan_fields(&targets);
    if let Some(raw) = fields.slug.as_deref() {
        for kind in scan_path(raw) {
            threats.push(FieldThreat { field: "slug", kind });
        }
    }
    threats
}

fn diff_changes(before: &ComposedPage, after: &ComposedPage) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    push_change(&mut changes, "slug", &before.slug, &after.slug);
    push_change(&mut changes, "meta_title", &before.meta_title, &after.meta_title);
    push_change(
        &mut changes,
        "meta_description",
        &before.meta_description,
        &after.meta_description,
    );
    push_change(&mut changes, "robots", &before.robots, &after.robots);
    if before.category != after.category {
        changes.push(FieldChange {
            field: "category".to_string(),
            old_value: json!(before.category.as_str()),
            new_value: json!(after.category.as_str()),
        });
    }
    if before.open_graph != after.open_graph {
        changes.push(FieldChange {
            field: "open_graph".to_string(),
            old_value: serde_json::to_value(&before.open_graph).unwrap_or(Value::Null),
            new_value: serde_json::to_value(&after.open_graph).unwrap_or(Value::Null),
        });
    }
    changes
}

fn push_change(changes: &mut Vec<FieldChange>, field: &str, old: &str, new: &str) {
    if old != new {
        changes.push(FieldChange {
            field: field.to_string(),
            old_value: json!(old),
            new_value: json!(new),
        });
    }
}
