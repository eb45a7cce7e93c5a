//! Public page route — a published page rendered for the requesting viewer.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::routes::ApiError;
use crate::routes::viewer::Viewer;
use crate::services::render::RenderedComponent;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPage {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub components: Vec<RenderedComponent>,
}

/// `GET /api/pages/:slug` — only published pages are visible.
pub async fn render_page(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
) -> Result<Json<PublicPage>, ApiError> {
    let Some(page) = state.pages.find_published_by_slug(&slug).await else {
        return Err(ApiError::not_found("E_PAGE_NOT_FOUND", format!("no published page at /{slug}")));
    };

    let components = state.renderer.render(&page, &viewer).await;
    Ok(Json(PublicPage {
        id: page.id,
        name: page.name,
        slug: page.slug,
        title: page.title,
        description: page.description,
        keywords: page.keywords,
        published_at: page.published_at,
        components,
    }))
}
