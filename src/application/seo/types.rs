//! Request and response shapes for the page metadata services.

use serde::{Deserialize, Serialize};

use crate::application::redirects::RedirectDenial;
use crate::domain::entities::OpenGraph;
use crate::domain::overlay::ComposedPage;
use crate::domain::types::PageCategory;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Listing filters and pagination. Arrives straight from query params, so
/// every field has a serde default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListPagesQuery {
    /// Case-insensitive substring match against path, slug, title, and
    /// description.
    pub search: Option<String>,
    pub category: Option<PageCategory>,
    pub is_custom: Option<bool>,
    pub page: u32,
    pub limit: u32,
    /// Skip the read cache for this call. Never part of the cache key.
    pub bypass_cache: bool,
}

impl Default for ListPagesQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            is_custom: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            bypass_cache: false,
        }
    }
}

impl ListPagesQuery {
    /// Search term with whitespace and case noise removed; `None` when the
    /// term is absent or blank.
    pub fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }
}

/// Site-wide counts, independent of the active filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingSummary {
    pub total_pages: u64,
    pub custom: u64,
    pub default: u64,
}

/// One page of composed listings plus the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageListing {
    pub items: Vec<ComposedPage>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub summary: ListingSummary,
}

/// Fields accepted by a single-page upsert. `None` leaves the stored value
/// untouched; on first write it simply stays unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpsertFields {
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub robots: Option<String>,
    pub category: Option<PageCategory>,
    pub open_graph: Option<OpenGraph>,
    /// When a slug change results, attempt a permanent redirect from the
    /// old slug URL. On by default.
    pub create_redirect: Option<bool>,
}

impl UpsertFields {
    pub fn create_redirect(&self) -> bool {
        self.create_redirect.unwrap_or(true)
    }
}

/// Fields accepted by a bulk update. Slug changes are excluded: a slug is
/// per-page unique and cannot meaningfully be applied to many paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BulkFields {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub robots: Option<String>,
    pub category: Option<PageCategory>,
    pub open_graph: Option<OpenGraph>,
}

impl BulkFields {
    pub fn into_upsert(self) -> UpsertFields {
        UpsertFields {
            slug: None,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            robots: self.robots,
            category: self.category,
            open_graph: self.open_graph,
            create_redirect: Some(false),
        }
    }
}

/// Result of a single-page upsert. A refused redirect is reported here as
/// data; it never fails the write that triggered it.
#[derive(Debug, Serialize)]
pub struct UpsertOutcome {
    pub page: ComposedPage,
    pub created: bool,
    pub slug_changed: bool,
    pub redirect_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_denied: Option<RedirectDenial>,
}

/// Role-dependent caps on the number of paths per bulk call.
#[derive(Debug, Clone, Copy)]
pub struct BulkPolicy {
    pub editor_limit: usize,
    pub admin_limit: usize,
}

impl Default for BulkPolicy {
    fn default() -> Self {
        Self {
            editor_limit: 20,
            admin_limit: 100,
        }
    }
}
