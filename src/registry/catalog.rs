//! YAML catalog of extra component definitions, loaded once at startup.
//!
//! The file is a YAML sequence of definitions using the same field names as
//! the JSON API (`type`, `name`, `category`, `defaultProps`, `propertySchema`).

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::{ComponentDefinition, ComponentRegistry, StaticAssetLoader};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read component catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid component catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse a catalog document.
///
/// # Errors
///
/// Returns `Yaml` if the document is not a sequence of definitions.
pub fn parse_catalog(source: &str) -> Result<Vec<ComponentDefinition>, CatalogError> {
    Ok(serde_yaml::from_str(source)?)
}

/// Read and parse a catalog file.
///
/// # Errors
///
/// Returns `Io` if the file can't be read, `Yaml` if it doesn't parse.
pub fn load_catalog(path: &Path) -> Result<Vec<ComponentDefinition>, CatalogError> {
    let source = std::fs::read_to_string(path)?;
    parse_catalog(&source)
}

/// Register catalog definitions; returns how many were accepted.
pub fn register_catalog(registry: &ComponentRegistry, definitions: Vec<ComponentDefinition>, asset_prefix: &str) -> usize {
    let loader = Arc::new(StaticAssetLoader::new(asset_prefix));
    let mut registered = 0;
    for definition in definitions {
        let component_type = definition.component_type.clone();
        match registry.register(definition, loader.clone()) {
            Ok(()) => registered += 1,
            Err(e) => warn!(error = %e, %component_type, "skipping catalog entry"),
        }
    }
    info!(registered, "component catalog loaded");
    registered
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
