use super::*;

#[test]
fn page_status_parses_known_values() {
    assert_eq!(PageStatus::from_str("draft"), Some(PageStatus::Draft));
    assert_eq!(PageStatus::from_str("published"), Some(PageStatus::Published));
    assert_eq!(PageStatus::from_str("archived"), Some(PageStatus::Archived));
    assert_eq!(PageStatus::from_str("deleted"), None);
}

#[test]
fn page_status_display_matches_wire_name() {
    assert_eq!(PageStatus::Published.to_string(), "published");
    let json = serde_json::to_string(&PageStatus::Archived).unwrap();
    assert_eq!(json, "\"archived\"");
}

#[test]
fn page_document_serializes_camel_case_fields() {
    let mut page = test_helpers::dummy_page(vec![test_helpers::dummy_component("c1", "banner", 0)]);
    page.components[0].custom_class = Some("hero".into());
    let json = serde_json::to_value(&page).unwrap();

    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
    assert!(json.get("publishedAt").is_none() || json["publishedAt"].is_null());
    let component = &json["components"][0];
    assert_eq!(component["type"], "banner");
    assert_eq!(component["customClass"], "hero");
    assert_eq!(component["position"], 0);
}

#[test]
fn page_document_deserializes_with_missing_optional_fields() {
    let json = serde_json::json!({
        "id": "00000000-0000-0000-0000-000000000001",
        "name": "About",
        "slug": "about",
        "title": "About us",
        "status": "published",
        "createdAt": "2026-01-24T00:00:00Z",
        "updatedAt": "2026-01-25T00:00:00Z",
        "publishedAt": "2026-01-25T00:00:00Z"
    });
    let page: PageDocument = serde_json::from_value(json).unwrap();
    assert_eq!(page.status, PageStatus::Published);
    assert!(page.components.is_empty());
    assert!(page.description.is_empty());
    assert!(page.published_at.is_some());
}

#[test]
fn component_lookup_by_id() {
    let page = test_helpers::dummy_page(vec![
        test_helpers::dummy_component("a", "banner", 0),
        test_helpers::dummy_component("b", "navbar", 1),
    ]);
    assert_eq!(page.component("b").map(|c| c.component_type.as_str()), Some("navbar"));
    assert!(page.component("z").is_none());
}

#[test]
fn component_instance_round_trips_animations_and_operators() {
    let json = serde_json::json!({
        "id": "hero",
        "type": "banner",
        "props": {"title": "Spring sale"},
        "position": 0,
        "conditions": [{"type": "device", "value": "mobile", "operator": "not_equals"}],
        "animations": [
            {"type": "fade", "trigger": "load", "duration": 300.0, "delay": 50.0, "easing": "ease-out"}
        ],
        "createdAt": "2026-01-24T00:00:00Z",
        "updatedAt": "2026-01-24T00:00:00Z"
    });
    let component: ComponentInstance = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(component.animations[0].trigger, AnimationTrigger::Load);
    assert_eq!(serde_json::to_value(&component).unwrap(), json);
}

#[test]
fn component_without_animations_omits_the_field() {
    let json = serde_json::to_value(test_helpers::dummy_component("a", "banner", 0)).unwrap();
    assert!(json.get("animations").is_none());
}

#[test]
fn page_document_keeps_template_id() {
    let mut page = test_helpers::dummy_page(Vec::new());
    page.template_id = Some("storefront".into());
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["templateId"], "storefront");
    let back: PageDocument = serde_json::from_value(json).unwrap();
    assert_eq!(back.template_id.as_deref(), Some("storefront"));
}
