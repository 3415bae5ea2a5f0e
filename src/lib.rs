//! seodeck: SEO metadata administration backend.
//!
//! The crate reconciles a fixed, immutable page catalog with per-page
//! override records stored in Postgres, guards slug uniqueness and redirect
//! safety, and serves composed listings through a TTL-bounded cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
