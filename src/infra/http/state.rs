use std::sync::Arc;

use crate::application::audit::AuditService;
use crate::application::redirects::RedirectService;
use crate::application::seo::SeoService;
use crate::application::sitemap::SitemapService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub seo: Arc<SeoService>,
    pub redirects: Arc<RedirectService>,
    pub sitemap: Arc<SitemapService>,
    pub audit: Arc<AuditService>,
    pub db: Arc<PostgresRepositories>,
}
