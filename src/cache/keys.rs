//! Query fingerprinting for cache keys.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::application::seo::ListPagesQuery;

/// Compute a hash for any hashable value.
pub fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint of the normalized filter and pagination parameters of a
/// listing query. Two queries that would produce the same listing hash to
/// the same fingerprint; the cache-bypass flag is deliberately excluded.
pub fn listing_fingerprint(query: &ListPagesQuery) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.normalized_search().hash(&mut hasher);
    query.category.hash(&mut hasher);
    query.is_custom.hash(&mut hasher);
    query.page.hash(&mut hasher);
    query.limit.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PageCategory;

    #[test]
    fn equivalent_queries_share_a_fingerprint() {
        let base = ListPagesQuery {
            search: Some("  Cloud  ".to_string()),
            ..ListPagesQuery::default()
        };
        let same = ListPagesQuery {
            search: Some("cloud".to_string()),
            ..ListPagesQuery::default()
        };
        assert_eq!(listing_fingerprint(&base), listing_fingerprint(&same));
    }

    #[test]
    fn bypass_flag_does_not_perturb_the_fingerprint() {
        let cached = ListPagesQuery::default();
        let bypassed = ListPagesQuery {
            bypass_cache: true,
            ..ListPagesQuery::default()
        };
        assert_eq!(listing_fingerprint(&cached), listing_fingerprint(&bypassed));
    }

    #[test]
    fn filters_and_pagination_perturb_the_fingerprint() {
        let base = ListPagesQuery::default();
        let filtered = ListPagesQuery {
            category: Some(PageCategory::Blog),
            ..ListPagesQuery::default()
        };
        let paged = ListPagesQuery {
            page: 2,
            ..ListPagesQuery::default()
        };
        assert_ne!(listing_fingerprint(&base), listing_fingerprint(&filtered));
        assert_ne!(listing_fingerprint(&base), listing_fingerprint(&paged));
    }
}
