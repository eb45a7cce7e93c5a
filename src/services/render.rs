//! Page renderer — turns a page snapshot into the ordered list of components
//! a given viewer should see.
//!
//! DESIGN
//! ======
//! Rendering is a pure read over a `PageDocument` the caller already cloned
//! out of the store, so it never observes a half-applied edit and needs no
//! locks. Instances are filtered in stored order: conditions first, then
//! registry resolution. Assets for the survivors load concurrently and are
//! stitched back in input order, so output order is input order minus the
//! skipped entries.
//!
//! ERROR HANDLING
//! ==============
//! A hidden, unresolvable or unloadable instance is skipped; the rest of the
//! page still renders. Unresolved types and loader failures log a warning.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::registry::{ComponentResolver, Resolution, ResolvedComponent};
use crate::services::condition::{ConditionEvaluator, ViewerContext};
use crate::state::{ComponentInstance, PageDocument, Props};

/// One component ready for the client to mount.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComponent {
    pub resolved_component: ResolvedComponent,
    pub props: Props,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Props>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_class: Option<String>,
    pub source_config: ComponentInstance,
}

/// Tally of what a render pass kept and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub rendered: usize,
    pub hidden: usize,
    pub unresolved: usize,
    pub failed: usize,
}

pub struct Renderer {
    resolver: Arc<dyn ComponentResolver>,
    evaluator: ConditionEvaluator,
}

impl Renderer {
    #[must_use]
    pub fn new(resolver: Arc<dyn ComponentResolver>, evaluator: ConditionEvaluator) -> Self {
        Self { resolver, evaluator }
    }

    /// Components of `page` visible to `ctx`, in stored order.
    pub async fn render(&self, page: &PageDocument, ctx: &ViewerContext) -> Vec<RenderedComponent> {
        self.render_with_report(page, ctx).await.0
    }

    pub async fn render_with_report(&self, page: &PageDocument, ctx: &ViewerContext) -> (Vec<RenderedComponent>, RenderReport) {
        let mut report = RenderReport::default();
        let mut survivors: Vec<(&ComponentInstance, Resolution)> = Vec::with_capacity(page.components.len());

        for instance in &page.components {
            if !self.evaluator.evaluate(&instance.conditions, ctx) {
                report.hidden += 1;
                continue;
            }
            let Some(resolution) = self.resolver.resolve(&instance.component_type) else {
                warn!(page_id = %page.id, component_id = %instance.id, component_type = %instance.component_type, "unregistered component type; skipping");
                report.unresolved += 1;
                continue;
            };
            survivors.push((instance, resolution));
        }

        let loads = survivors
            .iter()
            .map(|(_, resolution)| resolution.loader.load(&resolution.definition));
        let loaded = join_all(loads).await;

        let mut rendered = Vec::with_capacity(survivors.len());
        for ((instance, _), result) in survivors.into_iter().zip(loaded) {
            match result {
                Ok(resolved_component) => rendered.push(RenderedComponent {
                    resolved_component,
                    props: instance.props.clone(),
                    style: instance.style.clone(),
                    custom_class: instance.custom_class.clone(),
                    source_config: instance.clone(),
                }),
                Err(e) => {
                    warn!(page_id = %page.id, component_id = %instance.id, error = %e, "component failed to load; skipping");
                    report.failed += 1;
                }
            }
        }

        report.rendered = rendered.len();
        debug!(page_id = %page.id, ?report, "page rendered");
        (rendered, report)
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
