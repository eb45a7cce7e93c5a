//! Component definition registry.
//!
//! DESIGN
//! ======
//! The registry maps a component type name to its definition (default props,
//! editable property schema, palette metadata) and to the loader that turns
//! the type into a renderable asset. It is an explicit object built once at
//! startup and shared via `Arc`; the editor routes, the page store and the
//! renderer all receive it by reference.
//!
//! Lookups are O(1) by type name. Registration is idempotent-safe: a late or
//! repeated register replaces the entry in place and keeps its palette slot,
//! so existing entries are never corrupted.

pub mod builtin;
pub mod catalog;
pub mod schema;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::Props;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("component type must not be empty")]
    EmptyType,
}

/// Palette grouping shown by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Layout,
    Content,
    Navigation,
    Promotion,
    Product,
    Custom,
}

impl ComponentCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Content => "content",
            Self::Navigation => "navigation",
            Self::Promotion => "promotion",
            Self::Product => "product",
            Self::Custom => "custom",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "layout" => Some(Self::Layout),
            "content" => Some(Self::Content),
            "navigation" => Some(Self::Navigation),
            "promotion" => Some(Self::Promotion),
            "product" => Some(Self::Product),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Value kind of an editable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    /// Enumerated choice; the allowed values are the schema's `options`.
    Select,
    Color,
    Image,
    Textarea,
    Array,
    Object,
}

impl PropertyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Color => "color",
            Self::Image => "image",
            Self::Textarea => "textarea",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: serde_json::Value,
    pub label: String,
}

/// How the editor presents and validates one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Schema of each element when `kind` is `array` and elements are objects.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub item_schema: BTreeMap<String, PropertySchema>,
    /// Schema of the nested fields when `kind` is `object`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertySchema>,
}

impl PropertySchema {
    #[must_use]
    pub fn new(kind: PropertyKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            placeholder: None,
            default: None,
            min: None,
            max: None,
            options: Vec::new(),
            rows: None,
            required: false,
            item_schema: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    #[must_use]
    pub fn options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(value, label)| SelectOption { value: serde_json::json!(value), label: (*label).to_owned() })
            .collect();
        self
    }

    #[must_use]
    pub fn items(mut self, fields: impl IntoIterator<Item = (&'static str, PropertySchema)>) -> Self {
        self.item_schema = fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = (&'static str, PropertySchema)>) -> Self {
        self.properties = fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        self
    }
}

/// A registered, reusable UI building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    pub category: ComponentCategory,
    #[serde(default)]
    pub default_props: Props,
    #[serde(default)]
    pub property_schema: BTreeMap<String, PropertySchema>,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ComponentDefinition {
    /// Default prop keys that have no schema entry. Empty for a well-formed
    /// definition: the schema must describe how to edit every default.
    #[must_use]
    pub fn missing_schema_keys(&self) -> Vec<&str> {
        self.default_props
            .keys()
            .filter(|key| !self.property_schema.contains_key(*key))
            .map(String::as_str)
            .collect()
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// The concrete renderable unit a loader hands back. Opaque to the page core
/// beyond its identity and asset location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    pub category: ComponentCategory,
    pub asset: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("component asset unavailable for {component_type}: {reason}")]
    Unavailable { component_type: String, reason: String },
}

/// Instantiation factory registered alongside each definition.
#[async_trait::async_trait]
pub trait ComponentLoader: Send + Sync {
    /// Resolve the renderable unit for `definition`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the asset cannot be produced.
    async fn load(&self, definition: &ComponentDefinition) -> Result<ResolvedComponent, LoadError>;
}

/// Maps a type to a static bundle under a fixed URL prefix.
#[derive(Debug, Clone)]
pub struct StaticAssetLoader {
    prefix: String,
}

impl StaticAssetLoader {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into().trim_end_matches('/').to_owned() }
    }
}

#[async_trait::async_trait]
impl ComponentLoader for StaticAssetLoader {
    async fn load(&self, definition: &ComponentDefinition) -> Result<ResolvedComponent, LoadError> {
        Ok(ResolvedComponent {
            component_type: definition.component_type.clone(),
            name: definition.name.clone(),
            category: definition.category,
            asset: format!("{}/{}.js", self.prefix, definition.component_type),
        })
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// A definition paired with its loader.
#[derive(Clone)]
pub struct Resolution {
    pub definition: Arc<ComponentDefinition>,
    pub loader: Arc<dyn ComponentLoader>,
}

/// Capability the store and renderer need from a registry.
pub trait ComponentResolver: Send + Sync {
    fn resolve(&self, component_type: &str) -> Option<Resolution>;
}

// =============================================================================
// REGISTRY
// =============================================================================

struct RegistryEntry {
    /// Registration sequence; keeps palette order stable across overwrites.
    seq: usize,
    definition: Arc<ComponentDefinition>,
    loader: Arc<dyn ComponentLoader>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in storefront components.
    #[must_use]
    pub fn with_builtins(asset_prefix: &str) -> Self {
        let registry = Self::new();
        builtin::register_builtins(&registry, asset_prefix);
        registry
    }

    /// Add or replace a definition and its loader. Surrounding whitespace is
    /// trimmed from the type, and the stored definition carries the trimmed
    /// type it is keyed by.
    ///
    /// # Errors
    ///
    /// Returns `EmptyType` if the definition's type is blank.
    pub fn register(&self, mut definition: ComponentDefinition, loader: Arc<dyn ComponentLoader>) -> Result<(), RegistryError> {
        let component_type = definition.component_type.trim().to_owned();
        if component_type.is_empty() {
            return Err(RegistryError::EmptyType);
        }
        definition.component_type.clone_from(&component_type);

        let missing = definition.missing_schema_keys();
        if !missing.is_empty() {
            warn!(%component_type, ?missing, "component defaults without property schema");
        }

        let definition = Arc::new(definition);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let next_seq = entries.len();
        if let Some(existing) = entries.get_mut(&component_type) {
            existing.definition = definition;
            existing.loader = loader;
            warn!(%component_type, "replaced existing component definition");
        } else {
            entries.insert(component_type.clone(), RegistryEntry { seq: next_seq, definition, loader });
            info!(%component_type, "registered component");
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, component_type: &str) -> Option<Arc<ComponentDefinition>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(component_type).map(|e| e.definition.clone())
    }

    #[must_use]
    pub fn is_registered(&self, component_type: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(component_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn list_all(&self) -> Vec<Arc<ComponentDefinition>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut ordered: Vec<&RegistryEntry> = entries.values().collect();
        ordered.sort_by_key(|e| e.seq);
        ordered.into_iter().map(|e| e.definition.clone()).collect()
    }

    #[must_use]
    pub fn list_by_category(&self, category: ComponentCategory) -> Vec<Arc<ComponentDefinition>> {
        self.list_all()
            .into_iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Distinct categories that have at least one definition.
    #[must_use]
    pub fn list_categories(&self) -> Vec<ComponentCategory> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .map(|e| e.definition.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl ComponentResolver for ComponentRegistry {
    fn resolve(&self, component_type: &str) -> Option<Resolution> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(component_type)
            .map(|e| Resolution { definition: e.definition.clone(), loader: e.loader.clone() })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
