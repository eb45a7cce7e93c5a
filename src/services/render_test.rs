use super::*;
use crate::registry::{ComponentCategory, ComponentDefinition, ComponentLoader, ComponentRegistry, LoadError};
use crate::services::condition::{Condition, ConditionKind, DeviceClass};
use crate::services::page::PageStore;
use crate::services::persistence::MemoryPageRepository;
use crate::state::test_helpers::{dummy_component, dummy_page, new_component, new_page, test_registry};
use serde_json::json;

fn renderer() -> Renderer {
    Renderer::new(test_registry(), ConditionEvaluator::default())
}

fn viewer(device: DeviceClass) -> ViewerContext {
    ViewerContext { device, ..ViewerContext::anonymous() }
}

fn rendered_ids(rendered: &[RenderedComponent]) -> Vec<&str> {
    rendered.iter().map(|r| r.source_config.id.as_str()).collect()
}

struct BrokenLoader;

#[async_trait::async_trait]
impl ComponentLoader for BrokenLoader {
    async fn load(&self, definition: &ComponentDefinition) -> Result<ResolvedComponent, LoadError> {
        Err(LoadError::Unavailable { component_type: definition.component_type.clone(), reason: "bundle missing".into() })
    }
}

#[tokio::test]
async fn hidden_component_is_skipped_in_order() {
    let mut middle = dummy_component("c1", "carousel", 1);
    middle.conditions = vec![Condition::new(ConditionKind::Device("mobile".into()))];
    let page = dummy_page(vec![dummy_component("c0", "banner", 0), middle, dummy_component("c2", "navbar", 2)]);

    let (rendered, report) = renderer().render_with_report(&page, &viewer(DeviceClass::Desktop)).await;
    assert_eq!(rendered_ids(&rendered), vec!["c0", "c2"]);
    assert_eq!(report, RenderReport { rendered: 2, hidden: 1, unresolved: 0, failed: 0 });

    let mobile = renderer().render(&page, &viewer(DeviceClass::Mobile)).await;
    assert_eq!(rendered_ids(&mobile), vec!["c0", "c1", "c2"]);
}

#[tokio::test]
async fn unknown_type_is_skipped_without_failing() {
    let page = dummy_page(vec![
        dummy_component("a", "banner", 0),
        dummy_component("b", "hologram", 1),
        dummy_component("c", "navbar", 2),
    ]);

    let (rendered, report) = renderer().render_with_report(&page, &ViewerContext::anonymous()).await;
    assert_eq!(rendered_ids(&rendered), vec!["a", "c"]);
    assert_eq!(report.unresolved, 1);
}

#[tokio::test]
async fn loader_failure_degrades_to_partial_page() {
    let registry = ComponentRegistry::with_builtins("/assets/components");
    let broken = ComponentDefinition {
        component_type: "flaky".into(),
        name: "Flaky".into(),
        icon: String::new(),
        description: String::new(),
        category: ComponentCategory::Custom,
        default_props: Props::new(),
        property_schema: std::collections::BTreeMap::new(),
        preview: String::new(),
        tags: Vec::new(),
    };
    registry.register(broken, Arc::new(BrokenLoader)).unwrap();
    let renderer = Renderer::new(Arc::new(registry), ConditionEvaluator::default());

    let page = dummy_page(vec![
        dummy_component("a", "flaky", 0),
        dummy_component("b", "banner", 1),
        dummy_component("c", "flaky", 2),
    ]);
    let (rendered, report) = renderer.render_with_report(&page, &ViewerContext::anonymous()).await;
    assert_eq!(rendered_ids(&rendered), vec!["b"]);
    assert_eq!(report.failed, 2);
}

#[tokio::test]
async fn rendered_component_carries_instance_config() {
    let mut instance = dummy_component("hero", "banner", 0);
    instance.custom_class = Some("hero".into());
    instance.style = json!({"margin": "0 auto"}).as_object().cloned();
    let page = dummy_page(vec![instance.clone()]);

    let rendered = renderer().render(&page, &ViewerContext::anonymous()).await;
    assert_eq!(rendered.len(), 1);
    let hero = &rendered[0];
    assert_eq!(hero.resolved_component.component_type, "banner");
    assert_eq!(hero.resolved_component.asset, "/assets/components/banner.js");
    assert_eq!(hero.props, instance.props);
    assert_eq!(hero.style, instance.style);
    assert_eq!(hero.custom_class.as_deref(), Some("hero"));
    assert_eq!(hero.source_config, instance);

    let json = serde_json::to_value(hero).unwrap();
    assert_eq!(json["resolvedComponent"]["type"], "banner");
    assert_eq!(json["customClass"], "hero");
    assert_eq!(json["sourceConfig"]["id"], "hero");
}

#[tokio::test]
async fn empty_page_renders_nothing() {
    let (rendered, report) = renderer()
        .render_with_report(&dummy_page(Vec::new()), &ViewerContext::anonymous())
        .await;
    assert!(rendered.is_empty());
    assert_eq!(report, RenderReport::default());
}

#[tokio::test]
async fn create_add_publish_render_scenario() {
    let registry = test_registry();
    let store = PageStore::new(Arc::new(MemoryPageRepository::new()), registry.clone());
    let renderer = Renderer::new(registry, ConditionEvaluator::default());

    let mut home = new_page("home");
    home.name = "Home".into();
    let page = store.create_page(home).await.unwrap();
    let mut banner = new_component("c1", "banner", json!({"title": "Sale"}));
    banner.position = Some(0);
    store.add_component(page.id, banner).await.unwrap().unwrap();
    let published = store.publish_page(page.id).await.unwrap().unwrap();

    let rendered = renderer.render(&published, &ViewerContext::anonymous()).await;
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].resolved_component.component_type, "banner");
    assert_eq!(rendered[0].props["title"], json!("Sale"));
}
