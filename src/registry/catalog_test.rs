use super::*;
use crate::registry::{ComponentCategory, PropertyKind};

const CATALOG: &str = r#"
- type: countdown
  name: Countdown
  icon: "⏱"
  category: promotion
  defaultProps:
    endsAt: "2026-12-31T23:59:59Z"
    label: Sale ends in
  propertySchema:
    endsAt:
      type: string
      label: Ends at
      required: true
    label:
      type: string
      label: Label
- type: spacer
  name: Spacer
  category: layout
  defaultProps:
    height: 24
  propertySchema:
    height:
      type: number
      label: Height
      min: 0
      max: 400
"#;

#[test]
fn parse_catalog_reads_definitions() {
    let defs = parse_catalog(CATALOG).unwrap();
    assert_eq!(defs.len(), 2);
    assert_eq!(defs[0].component_type, "countdown");
    assert_eq!(defs[0].category, ComponentCategory::Promotion);
    assert!(defs[0].property_schema["endsAt"].required);
    assert_eq!(defs[1].property_schema["height"].kind, PropertyKind::Number);
    assert_eq!(defs[1].property_schema["height"].max, Some(400.0));
    assert!(defs[1].missing_schema_keys().is_empty());
}

#[test]
fn parse_catalog_rejects_unknown_category() {
    let result = parse_catalog("- type: x\n  name: X\n  category: gadgets\n");
    assert!(matches!(result, Err(CatalogError::Yaml(_))));
}

#[test]
fn register_catalog_skips_blank_types() {
    let registry = ComponentRegistry::new();
    let mut defs = parse_catalog(CATALOG).unwrap();
    defs[1].component_type = String::new();
    let registered = register_catalog(&registry, defs, "/assets");
    assert_eq!(registered, 1);
    assert!(registry.is_registered("countdown"));
}

#[test]
fn load_catalog_missing_file_is_io_error() {
    let result = load_catalog(Path::new("/nonexistent/pagecraft/catalog.yaml"));
    assert!(matches!(result, Err(CatalogError::Io(_))));
}
