//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the HTTP surface under a single Axum router: the
//! component palette, the page editor API, the public page render endpoint,
//! and a health probe. Handlers translate requests into store, registry and
//! renderer calls; service errors become `{code, message, retryable}` bodies.

pub mod components;
pub mod pages;
pub mod public;
pub mod viewer;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode};
use crate::services::page::PageError;
use crate::services::persistence::PersistenceError;
use crate::state::AppState;

// =============================================================================
// ERRORS
// =============================================================================

/// Error reply: an HTTP status plus the JSON error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self { status, body: ErrorBody::new(code, message) }
    }

    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "E_BAD_REQUEST", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        let status = page_error_to_status(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "page operation failed");
        }
        Self { status, body: ErrorBody::from_error(&err) }
    }
}

pub(crate) fn page_error_to_status(err: &PageError) -> StatusCode {
    match err {
        PageError::SlugTaken(_)
        | PageError::DuplicateComponent(_)
        | PageError::PositionTaken(_)
        | PageError::InvalidTransition { .. }
        | PageError::Archived(_)
        | PageError::Persistence(PersistenceError::UniqueViolation { .. }) => StatusCode::CONFLICT,
        PageError::InvalidSlug(_)
        | PageError::MissingField(_)
        | PageError::UnknownComponentType(_)
        | PageError::InvalidProps { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PageError::Persistence(_) if err.retryable() => StatusCode::SERVICE_UNAVAILABLE,
        PageError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Full application router with CORS, compression and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/components", get(components::list_all))
        .route("/api/components/categories", get(components::list_categories))
        .route("/api/components/category/{category}", get(components::list_by_category))
        .route("/api/components/{component_type}", get(components::get_definition))
        .route("/api/editor/pages", get(pages::list_pages).post(pages::create_page))
        .route("/api/editor/pages/{id}", get(pages::get_page).patch(pages::save_page))
        .route("/api/editor/pages/{id}/load", post(pages::load_page))
        .route("/api/editor/pages/{id}/publish", post(pages::publish_page))
        .route("/api/editor/pages/{id}/unpublish", post(pages::unpublish_page))
        .route("/api/editor/pages/{id}/archive", post(pages::archive_page))
        .route("/api/editor/pages/{id}/components", post(pages::add_component))
        .route(
            "/api/editor/pages/{id}/components/{component_id}",
            patch(pages::update_component).delete(pages::remove_component),
        )
        .route("/api/editor/pages/{id}/reorder", put(pages::reorder_components))
        .route("/api/editor/current", get(pages::current_page))
        .route("/api/pages/{slug}", get(public::render_page))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
