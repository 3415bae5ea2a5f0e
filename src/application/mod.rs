//! Application services layer.

pub mod audit;
pub mod error;
pub mod monitor;
pub mod principal;
pub mod redirects;
pub mod repos;
pub mod seo;
pub mod sitemap;
