//! Page metadata services: listings, single-page reads, writes, bulk.

mod bulk;
mod service;
mod types;

pub use bulk::{BulkItemOutcome, BulkOutcome, BulkRequest, ImportItem};
pub use service::SeoService;
pub use types::{
    BulkFields, BulkPolicy, ListPagesQuery, ListingSummary, PageListing, UpsertFields,
    UpsertOutcome,
};
