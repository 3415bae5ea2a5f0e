//! Sitemap entry generation from the composed page views.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::catalog::PageCatalog;
use crate::domain::overlay::{ComposedPage, compose};
use crate::domain::types::PageCategory;

use super::error::SeoError;
use super::monitor::OpTimer;
use super::principal::{Principal, SeoScope};
use super::repos::SeoPagesRepo;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_modified: Option<OffsetDateTime>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Crawl hints keyed on the composed category, not the catalog default, so
/// a recategorized page moves with its override.
fn crawl_hints(category: PageCategory) -> (&'static str, f32) {
    match category {
        PageCategory::Main => ("weekly", 1.0),
        PageCategory::Services => ("monthly", 0.9),
        PageCategory::Blog => ("daily", 0.7),
        PageCategory::About => ("monthly", 0.6),
        PageCategory::Contact => ("yearly", 0.6),
        PageCategory::Other => ("yearly", 0.3),
    }
}

/// Map one composed page to its sitemap entry. The public URL is the slug
/// segment; the site root keeps `/` whatever its slug says.
pub fn entry_for(page: &ComposedPage) -> SitemapEntry {
    let url = if page.path == "/" {
        "/".to_string()
    } else {
        format!("/{}", page.slug)
    };
    let (change_frequency, priority) = crawl_hints(page.category);
    SitemapEntry {
        url,
        last_modified: page.updated_at,
        change_frequency,
        priority,
    }
}

#[derive(Clone)]
pub struct SitemapService {
    catalog: Arc<PageCatalog>,
    pages: Arc<dyn SeoPagesRepo>,
}

impl SitemapService {
    pub fn new(catalog: Arc<PageCatalog>, pages: Arc<dyn SeoPagesRepo>) -> Self {
        Self { catalog, pages }
    }

    /// One entry per catalog page, in path order.
    pub async fn generate(
        &self,
        site_id: &str,
        principal: &Principal,
    ) -> Result<Vec<SitemapEntry>, SeoError> {
        principal.requires(SeoScope::SeoRead)?;
        let _timer = OpTimer::start("sitemap.generate");

        let records = self.pages.list_for_site(site_id).await?;
        let entries = self
            .catalog
            .iter()
            .map(|defaults| {
                let record = records.iter().find(|record| record.path == defaults.path);
                entry_for(&compose(defaults, record))
            })
            .collect();
        Ok(entries)
    }
}
