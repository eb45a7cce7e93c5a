//! Shared application state and the page document model.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the component registry, the page store (which owns the
//! canonical page documents), and the renderer. The registry is built once
//! at startup and shared by reference; nothing here is a global.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::registry::ComponentRegistry;
use crate::services::condition::{Condition, ConditionEvaluator};
use crate::services::page::PageStore;
use crate::services::persistence::PageRepository;
use crate::services::render::Renderer;

/// Property bag for component props and style. Alias to reduce noise in signatures.
pub type Props = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// PAGE STATUS
// =============================================================================

/// Lifecycle status of a page. `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
    Archived,
}

impl PageStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ANIMATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Fade,
    Slide,
    Scale,
    Bounce,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationTrigger {
    Load,
    Scroll,
    Hover,
    Click,
}

/// Entrance or interaction effect the client plays for a component.
/// Timings are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentAnimation {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub trigger: AnimationTrigger,
    pub duration: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub easing: String,
}

// =============================================================================
// COMPONENT INSTANCE
// =============================================================================

/// One placed, configured occurrence of a registered component on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    /// Unique within the owning page.
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub props: Props,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_class: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<ComponentAnimation>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// =============================================================================
// PAGE DOCUMENT
// =============================================================================

/// A persisted page: metadata, lifecycle status, and the ordered component list.
/// Mirrors the `pages.document` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    /// Render order is list order, top to bottom.
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
    pub status: PageStatus,
    /// Template the page was started from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

impl PageDocument {
    #[must_use]
    pub fn component(&self, component_id: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.id == component_id)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ComponentRegistry>,
    pub pages: Arc<PageStore>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>, repo: Arc<dyn PageRepository>, evaluator: ConditionEvaluator) -> Self {
        let pages = Arc::new(PageStore::new(repo, registry.clone()));
        let renderer = Arc::new(Renderer::new(registry.clone(), evaluator));
        Self { registry, pages, renderer }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
