//! Listing cache.
//!
//! Memoizes composed SEO listings per `(site, query fingerprint)`. The
//! cache is a derived, disposable view: it is never the source of truth
//! and can be rebuilt from the catalog and the store at any time. Writes
//! invalidate a site's entries synchronously before they return, so there
//! is no stale-read window under correct operation.

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{hash_value, listing_fingerprint};
pub use store::{ListingCache, ListingKey};
