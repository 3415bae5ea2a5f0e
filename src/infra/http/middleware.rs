//! Request identity extraction.
//!
//! Authentication proper happens upstream (gateway or session layer); this
//! service trusts the forwarded identity headers and only translates them
//! into a [`Principal`] for the scope checks in the application layer.

use std::str::FromStr;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::principal::{Principal, Role};

use super::error::ApiError;

const ACTOR_HEADER: &str = "x-actor";
const ROLE_HEADER: &str = "x-role";

pub async fn principal_auth(mut request: Request<Body>, next: Next) -> Response {
    let actor = match header_value(&request, ACTOR_HEADER) {
        Some(actor) if !actor.is_empty() => actor,
        _ => {
            return ApiError::unauthorized("missing or empty x-actor header").into_response();
        }
    };

    let role = match header_value(&request, ROLE_HEADER).map(|raw| Role::from_str(&raw)) {
        Some(Ok(role)) => role,
        Some(Err(err)) => return ApiError::unauthorized(err).into_response(),
        None => return ApiError::unauthorized("missing x-role header").into_response(),
    };

    request.extensions_mut().insert(Principal::new(actor, role));
    next.run(request).await
}

fn header_value(request: &Request<Body>, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
}
