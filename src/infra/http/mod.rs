//! HTTP surface: router assembly over the application services.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub fn build_router(state: ApiState) -> Router {
    let api = Router::new()
        .route("/api/v1/sites/{site_id}/pages", get(handlers::list_pages))
        .route(
            "/api/v1/sites/{site_id}/page",
            get(handlers::get_page)
                .put(handlers::upsert_page)
                .delete(handlers::reset_page),
        )
        .route("/api/v1/sites/{site_id}/bulk", post(handlers::bulk_apply))
        .route(
            "/api/v1/sites/{site_id}/redirects",
            get(handlers::list_redirects).post(handlers::create_redirect),
        )
        .route(
            "/api/v1/sites/{site_id}/redirects/delete",
            post(handlers::delete_redirects),
        )
        .route("/api/v1/sites/{site_id}/sitemap", get(handlers::sitemap))
        .route("/api/v1/sites/{site_id}/audit", get(handlers::list_audit))
        .layer(axum_middleware::from_fn(middleware::principal_auth));

    // The health probe stays outside the identity layer.
    Router::new()
        .route("/healthz", get(handlers::health))
        .merge(api)
        .with_state(state)
}
