//! Page editor routes — CRUD, lifecycle transitions and component edits.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::ApiError;
use crate::services::page::{ComponentPatch, NewComponent, NewPage, PagePatch};
use crate::state::{AppState, ComponentInstance, PageDocument, PageStatus};

fn page_not_found(id: Uuid) -> ApiError {
    ApiError::not_found("E_PAGE_NOT_FOUND", format!("page not found: {id}"))
}

fn component_not_found(component_id: &str) -> ApiError {
    ApiError::not_found("E_COMPONENT_NOT_FOUND", format!("component not found: {component_id}"))
}

/// Tell a missing page apart from a missing component after a `None` result.
async fn missing(state: &AppState, id: Uuid, component_id: &str) -> ApiError {
    if state.pages.get_page(id).await.is_some() {
        component_not_found(component_id)
    } else {
        page_not_found(id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `draft`, `published`, `archived`, or `active` (everything but archived).
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    pub ids: Vec<String>,
    /// Keep components missing from `ids` after the listed ones instead of
    /// dropping them.
    #[serde(default)]
    pub preserve_omitted: bool,
}

/// `GET /api/editor/pages`
pub async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PageDocument>>, ApiError> {
    let pages = match query.status.as_deref() {
        None => state.pages.list_pages().await,
        Some("active") => state.pages.active_pages().await,
        Some(raw) => match PageStatus::from_str(raw) {
            Some(PageStatus::Draft) => state.pages.draft_pages().await,
            Some(PageStatus::Published) => state.pages.published_pages().await,
            Some(PageStatus::Archived) => {
                let mut pages = state.pages.list_pages().await;
                pages.retain(|p| p.status == PageStatus::Archived);
                pages
            }
            None => return Err(ApiError::bad_request(format!("unknown page status: {raw}"))),
        },
    };
    Ok(Json(pages))
}

/// `POST /api/editor/pages`
pub async fn create_page(
    State(state): State<AppState>,
    Json(body): Json<NewPage>,
) -> Result<(StatusCode, Json<PageDocument>), ApiError> {
    let page = state.pages.create_page(body).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// `GET /api/editor/pages/:id`
pub async fn get_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .get_page(id)
        .await
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}

/// `PATCH /api/editor/pages/:id`
pub async fn save_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PagePatch>,
) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .save_page(id, body)
        .await?
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}

/// `POST /api/editor/pages/:id/load` — open the page in the editing session.
pub async fn load_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .load_page(id)
        .await?
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}

/// `GET /api/editor/current`
pub async fn current_page(State(state): State<AppState>) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .current_page()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("E_NO_CURRENT_PAGE", "no page is open for editing"))
}

/// `POST /api/editor/pages/:id/publish`
pub async fn publish_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .publish_page(id)
        .await?
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}

/// `POST /api/editor/pages/:id/unpublish`
pub async fn unpublish_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .unpublish_page(id)
        .await?
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}

/// `POST /api/editor/pages/:id/archive`
pub async fn archive_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PageDocument>, ApiError> {
    state
        .pages
        .archive_page(id)
        .await?
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}

/// `POST /api/editor/pages/:id/components`
pub async fn add_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewComponent>,
) -> Result<(StatusCode, Json<ComponentInstance>), ApiError> {
    let component = state
        .pages
        .add_component(id, body)
        .await?
        .ok_or_else(|| page_not_found(id))?;
    Ok((StatusCode::CREATED, Json(component)))
}

/// `PATCH /api/editor/pages/:id/components/:component_id`
pub async fn update_component(
    State(state): State<AppState>,
    Path((id, component_id)): Path<(Uuid, String)>,
    Json(body): Json<ComponentPatch>,
) -> Result<Json<ComponentInstance>, ApiError> {
    match state.pages.update_component(id, &component_id, body).await? {
        Some(component) => Ok(Json(component)),
        None => Err(missing(&state, id, &component_id).await),
    }
}

/// `DELETE /api/editor/pages/:id/components/:component_id`
pub async fn remove_component(
    State(state): State<AppState>,
    Path((id, component_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    if state.pages.remove_component(id, &component_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing(&state, id, &component_id).await)
    }
}

/// `PUT /api/editor/pages/:id/reorder`
pub async fn reorder_components(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<PageDocument>, ApiError> {
    let found = if body.preserve_omitted {
        state.pages.move_components(id, &body.ids).await?
    } else {
        state.pages.reorder_components(id, &body.ids).await?
    };
    if !found {
        return Err(page_not_found(id));
    }
    state
        .pages
        .get_page(id)
        .await
        .map(Json)
        .ok_or_else(|| page_not_found(id))
}
