//! Component palette routes — read-only views of the registry.

use axum::extract::{Path, State};
use axum::response::Json;

use crate::registry::{ComponentCategory, ComponentDefinition};
use crate::routes::ApiError;
use crate::state::AppState;

fn owned(definitions: Vec<std::sync::Arc<ComponentDefinition>>) -> Vec<ComponentDefinition> {
    definitions
        .into_iter()
        .map(|d| d.as_ref().clone())
        .collect()
}

/// `GET /api/components` — every definition in palette order.
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<ComponentDefinition>> {
    Json(owned(state.registry.list_all()))
}

/// `GET /api/components/categories` — categories with at least one component.
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<ComponentCategory>> {
    Json(state.registry.list_categories())
}

/// `GET /api/components/category/:category`
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ComponentDefinition>>, ApiError> {
    let Some(category) = ComponentCategory::from_str(&category) else {
        return Err(ApiError::bad_request(format!("unknown component category: {category}")));
    };
    Ok(Json(owned(state.registry.list_by_category(category))))
}

/// `GET /api/components/:type`
pub async fn get_definition(
    State(state): State<AppState>,
    Path(component_type): Path<String>,
) -> Result<Json<ComponentDefinition>, ApiError> {
    state
        .registry
        .get(&component_type)
        .map(|d| Json(d.as_ref().clone()))
        .ok_or_else(|| ApiError::not_found("E_COMPONENT_TYPE_NOT_FOUND", format!("component type not registered: {component_type}")))
}
