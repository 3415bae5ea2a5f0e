//! REST handlers: extract, delegate to a service, map the outcome. No
//! business rules live here.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::application::error::SeoError;
use crate::application::principal::{Principal, SeoScope};
use crate::application::redirects::RedirectAttempt;
use crate::application::repos::RedirectQueryFilter;
use crate::application::seo::{BulkOutcome, BulkRequest, ListPagesQuery, PageListing, UpsertFields, UpsertOutcome};
use crate::application::sitemap::SitemapEntry;
use crate::domain::entities::{AuditLogRecord, RedirectRecord};
use crate::domain::overlay::ComposedPage;
use crate::domain::types::RedirectStatus;

use super::error::ApiError;
use super::state::ApiState;

/// Single-page resources are addressed by a `path` query parameter so the
/// catalog root `/` is reachable like any other page.
#[derive(Debug, Deserialize)]
pub struct PagePathQuery {
    pub path: String,
}

pub async fn list_pages(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListPagesQuery>,
) -> Result<Json<PageListing>, ApiError> {
    Ok(Json(
        state.seo.list_pages(&site_id, &query, &principal).await?,
    ))
}

pub async fn get_page(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PagePathQuery>,
) -> Result<Json<ComposedPage>, ApiError> {
    Ok(Json(
        state.seo.get_page(&site_id, &query.path, &principal).await?,
    ))
}

pub async fn upsert_page(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PagePathQuery>,
    Json(fields): Json<UpsertFields>,
) -> Result<Json<UpsertOutcome>, ApiError> {
    Ok(Json(
        state
            .seo
            .upsert_page(&site_id, &query.path, fields, &principal)
            .await?,
    ))
}

pub async fn reset_page(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PagePathQuery>,
) -> Result<Json<ComposedPage>, ApiError> {
    Ok(Json(
        state
            .seo
            .reset_page(&site_id, &query.path, &principal)
            .await?,
    ))
}

pub async fn bulk_apply(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkOutcome>, ApiError> {
    Ok(Json(
        state.seo.bulk_apply(&site_id, request, &principal).await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RedirectListQuery {
    pub search: Option<String>,
    pub status: Option<u16>,
    pub page: u32,
    pub limit: u32,
}

impl Default for RedirectListQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            page: 1,
            limit: 20,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedirectListing {
    pub items: Vec<RedirectRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

pub async fn list_redirects(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RedirectListQuery>,
) -> Result<Json<RedirectListing>, ApiError> {
    let status = query
        .status
        .map(RedirectStatus::try_from)
        .transpose()
        .map_err(ApiError::bad_request)?;
    let filter = RedirectQueryFilter {
        search: query.search,
        status,
    };

    let page = state
        .redirects
        .list_redirects(&site_id, &filter, query.page, query.limit, &principal)
        .await?;
    Ok(Json(RedirectListing {
        items: page.items,
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateRedirectBody {
    pub from_path: String,
    pub to_path: String,
    /// Redirect status code; defaults to 301.
    pub status: Option<RedirectStatus>,
}

pub async fn create_redirect(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateRedirectBody>,
) -> Result<Response, ApiError> {
    let status = body.status.unwrap_or(RedirectStatus::MovedPermanently);
    let attempt = state
        .redirects
        .create_redirect_safely(&site_id, &body.from_path, &body.to_path, status, &principal)
        .await?;

    match attempt {
        RedirectAttempt::Created(record) => {
            Ok((StatusCode::CREATED, Json(record)).into_response())
        }
        RedirectAttempt::Denied(denial) => Err(ApiError::from_denial(&denial)),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteRedirectsBody {
    pub ids: Vec<Uuid>,
}

pub async fn delete_redirects(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<DeleteRedirectsBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state
        .redirects
        .delete_redirects(&site_id, &body.ids, &principal)
        .await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn sitemap(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<SitemapEntry>>, ApiError> {
    Ok(Json(state.sitemap.generate(&site_id, &principal).await?))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuditListQuery {
    pub limit: u32,
}

impl Default for AuditListQuery {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

pub async fn list_audit(
    State(state): State<ApiState>,
    Path(site_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AuditListQuery>,
) -> Result<Json<Vec<AuditLogRecord>>, ApiError> {
    principal
        .requires(SeoScope::SeoRead)
        .map_err(SeoError::from)?;
    let entries = state
        .audit
        .list_recent(&site_id, query.limit)
        .await
        .map_err(SeoError::from)?;
    Ok(Json(entries))
}

pub async fn health(State(state): State<ApiState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            tracing::error!(error = %err, "database health check failed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
