//! The predefined page catalog.
//!
//! The catalog is the sole source of truth for which pages exist. It is
//! built once at process start, validated, and shared behind an `Arc`;
//! nothing mutates it afterwards, so it is safe across concurrent requests
//! without locking.

use std::collections::HashMap;

use thiserror::Error;

use super::types::PageCategory;

/// One manageable page as defined at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct PredefinedPage {
    /// Canonical route, e.g. `/` or `/services/ai-ml`. Unique.
    pub path: String,
    /// Default URL slug. Unique within the catalog, pre-normalized.
    pub default_slug: String,
    pub category: PageCategory,
    pub default_title: String,
    pub default_description: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog path `{path}` is declared twice")]
    DuplicatePath { path: String },
    #[error("catalog slug `{slug}` is declared twice")]
    DuplicateSlug { slug: String },
    #[error("catalog slug `{slug}` is not in normalized form")]
    UnnormalizedSlug { slug: String },
    #[error("catalog path `{path}` must start with `/`")]
    MalformedPath { path: String },
}

/// Immutable enumeration of every manageable page, indexed by path.
#[derive(Debug)]
pub struct PageCatalog {
    pages: Vec<PredefinedPage>,
    by_path: HashMap<String, usize>,
}

impl PageCatalog {
    /// Build a catalog from explicit entries, enforcing path and slug
    /// uniqueness. Entries are kept sorted by path so iteration order is a
    /// stable total order.
    pub fn new(mut pages: Vec<PredefinedPage>) -> Result<Self, CatalogError> {
        pages.sort_by(|a, b| a.path.cmp(&b.path));

        let mut by_path = HashMap::with_capacity(pages.len());
        let mut seen_slugs = HashMap::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            if !page.path.starts_with('/') {
                return Err(CatalogError::MalformedPath {
                    path: page.path.clone(),
                });
            }
            if slug::slugify(&page.default_slug) != page.default_slug {
                return Err(CatalogError::UnnormalizedSlug {
                    slug: page.default_slug.clone(),
                });
            }
            if by_path.insert(page.path.clone(), index).is_some() {
                return Err(CatalogError::DuplicatePath {
                    path: page.path.clone(),
                });
            }
            if seen_slugs
                .insert(page.default_slug.clone(), index)
                .is_some()
            {
                return Err(CatalogError::DuplicateSlug {
                    slug: page.default_slug.clone(),
                });
            }
        }

        Ok(Self { pages, by_path })
    }

    /// The catalog shipped with the deployment.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(standard_entries())
    }

    pub fn get(&self, path: &str) -> Option<&PredefinedPage> {
        self.by_path.get(path).map(|&index| &self.pages[index])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Iterate pages in path order.
    pub fn iter(&self) -> impl Iterator<Item = &PredefinedPage> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn entry(
    path: &str,
    default_slug: &str,
    category: PageCategory,
    title: &str,
    description: &str,
) -> PredefinedPage {
    PredefinedPage {
        path: path.to_string(),
        default_slug: default_slug.to_string(),
        category,
        default_title: title.to_string(),
        default_description: description.to_string(),
    }
}

fn standard_entries() -> Vec<PredefinedPage> {
    vec![
        entry(
            "/",
            "home",
            PageCategory::Main,
            "Home",
            "Software consultancy for product teams that ship.",
        ),
        entry(
            "/services",
            "services",
            PageCategory::Services,
            "Services",
            "Engineering services across the product lifecycle.",
        ),
        entry(
            "/services/ai-ml",
            "ai-ml-services",
            PageCategory::Services,
            "AI & Machine Learning",
            "Applied machine learning, from prototype to production.",
        ),
        entry(
            "/services/cloud",
            "cloud-services",
            PageCategory::Services,
            "Cloud Engineering",
            "Cloud architecture, migration, and cost control.",
        ),
        entry(
            "/services/web",
            "web-development",
            PageCategory::Services,
            "Web Development",
            "Web applications built for maintainability.",
        ),
        entry(
            "/blog",
            "blog",
            PageCategory::Blog,
            "Blog",
            "Notes from the team on engineering and delivery.",
        ),
        entry(
            "/about",
            "about-us",
            PageCategory::About,
            "About Us",
            "Who we are and how we work.",
        ),
        entry(
            "/careers",
            "careers",
            PageCategory::About,
            "Careers",
            "Open roles and what it is like to work here.",
        ),
        entry(
            "/contact",
            "contact",
            PageCategory::Contact,
            "Contact",
            "Get in touch with the team.",
        ),
        entry(
            "/privacy",
            "privacy-policy",
            PageCategory::Other,
            "Privacy Policy",
            "How we handle your data.",
        ),
        entry(
            "/terms",
            "terms-of-service",
            PageCategory::Other,
            "Terms of Service",
            "Terms governing use of this site.",
        ),
    ]
}
