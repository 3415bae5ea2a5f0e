//! Composition of catalog defaults with an optional override record.
//!
//! The precedence rule (override wins field-by-field, unset fields fall
//! back to defaults) lives in exactly one function so it can be tested in
//! isolation instead of being scattered across call sites.

use serde::Serialize;
use time::OffsetDateTime;

use super::catalog::PredefinedPage;
use super::entities::{OpenGraph, SeoPageRecord};
use super::types::PageCategory;

pub const DEFAULT_ROBOTS: &str = "index,follow";

/// A fully-resolved read view for a single page: every field has a value,
/// whether it came from the override record or the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedPage {
    pub path: String,
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,
    pub robots: String,
    pub category: PageCategory,
    pub open_graph: OpenGraph,
    pub is_custom: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Overlay `record` onto `defaults`. `is_custom` is true iff a record
/// exists, regardless of how many of its fields are set.
pub fn compose(defaults: &PredefinedPage, record: Option<&SeoPageRecord>) -> ComposedPage {
    let Some(record) = record else {
        return ComposedPage {
            path: defaults.path.clone(),
            slug: defaults.default_slug.clone(),
            meta_title: defaults.default_title.clone(),
            meta_description: defaults.default_description.clone(),
            robots: DEFAULT_ROBOTS.to_string(),
            category: defaults.category,
            open_graph: OpenGraph::default(),
            is_custom: false,
            updated_at: None,
        };
    };

    ComposedPage {
        path: defaults.path.clone(),
        slug: record
            .slug
            .clone()
            .unwrap_or_else(|| defaults.default_slug.clone()),
        meta_title: record
            .meta_title
            .clone()
            .unwrap_or_else(|| defaults.default_title.clone()),
        meta_description: record
            .meta_description
            .clone()
            .unwrap_or_else(|| defaults.default_description.clone()),
        robots: record
            .robots
            .clone()
            .unwrap_or_else(|| DEFAULT_ROBOTS.to_string()),
        category: record.category.unwrap_or(defaults.category),
        open_graph: record.open_graph.clone(),
        is_custom: true,
        updated_at: Some(record.updated_at),
    }
}

/// Effective slug for a page, whether or not an override exists.
pub fn effective_slug(defaults: &PredefinedPage, record: Option<&SeoPageRecord>) -> String {
    record
        .and_then(|record| record.slug.clone())
        .unwrap_or_else(|| defaults.default_slug.clone())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn defaults() -> PredefinedPage {
        PredefinedPage {
            path: "/about".to_string(),
            default_slug: "about-us".to_string(),
            category: PageCategory::About,
            default_title: "About Us".to_string(),
            default_description: "Who we are.".to_string(),
        }
    }

    fn record() -> SeoPageRecord {
        SeoPageRecord {
            id: Uuid::new_v4(),
            site_id: "main".to_string(),
            path: "/about".to_string(),
            slug: None,
            meta_title: None,
            meta_description: None,
            robots: None,
            category: None,
            open_graph: OpenGraph::default(),
            is_custom: true,
            created_by: "tests".to_string(),
            updated_by: "tests".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn absent_record_yields_pure_defaults() {
        let composed = compose(&defaults(), None);
        assert_eq!(composed.slug, "about-us");
        assert_eq!(composed.meta_title, "About Us");
        assert_eq!(composed.meta_description, "Who we are.");
        assert_eq!(composed.robots, DEFAULT_ROBOTS);
        assert_eq!(composed.category, PageCategory::About);
        assert!(!composed.is_custom);
        assert!(composed.updated_at.is_none());
    }

    #[test]
    fn unset_override_fields_fall_back_field_by_field() {
        let mut record = record();
        record.meta_title = Some("About the Team".to_string());

        let composed = compose(&defaults(), Some(&record));
        assert_eq!(composed.meta_title, "About the Team");
        // Everything else still comes from the catalog.
        assert_eq!(composed.slug, "about-us");
        assert_eq!(composed.meta_description, "Who we are.");
        assert_eq!(composed.robots, DEFAULT_ROBOTS);
        assert!(composed.is_custom);
    }

    #[test]
    fn set_override_fields_win() {
        let mut record = record();
        record.slug = Some("about-the-team".to_string());
        record.meta_description = Some("The long story.".to_string());
        record.robots = Some("noindex,nofollow".to_string());
        record.category = Some(PageCategory::Other);

        let composed = compose(&defaults(), Some(&record));
        assert_eq!(composed.slug, "about-the-team");
        assert_eq!(composed.meta_description, "The long story.");
        assert_eq!(composed.robots, "noindex,nofollow");
        assert_eq!(composed.category, PageCategory::Other);
    }

    #[test]
    fn is_custom_reflects_record_existence_not_field_count() {
        let composed = compose(&defaults(), Some(&record()));
        assert!(composed.is_custom);
    }

    #[test]
    fn effective_slug_prefers_override() {
        let mut record = record();
        assert_eq!(effective_slug(&defaults(), Some(&record)), "about-us");
        record.slug = Some("about-the-team".to_string());
        assert_eq!(effective_slug(&defaults(), Some(&record)), "about-the-team");
        assert_eq!(effective_slug(&defaults(), None), "about-us");
    }
}
