// src/panel/mod.rs
//
// Collapsible sidebar sections. Each section owns a pure render function over
// a state snapshot; the registry re-renders a section's markup only while it
// is expanded, and immediately on expand so a collapsed section never shows
// stale content when opened.

pub mod financials;
pub mod production;
pub mod retail;

use std::time::Instant;

use tracing::debug;

use crate::core::dom::{Document, NodeId};
use crate::state::AppState;

/// Everything a section renderer may read. Renderers never mutate.
pub struct RenderCtx<'a> {
    pub state: &'a AppState,
    pub doc: &'a Document,
    pub selected_row: Option<NodeId>,
    pub now: Instant,
}

type UpdateFn = fn(&RenderCtx) -> String;

pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub collapsed: bool,
    update: UpdateFn,
    /// Last rendered markup, kept across collapse.
    pub markup: String,
}

#[derive(Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register once per id; a duplicate registration is ignored.
    pub fn register(
        &mut self,
        id: &'static str,
        title: &'static str,
        icon: &'static str,
        collapsed: bool,
        update: UpdateFn,
    ) -> bool {
        if self.sections.iter().any(|s| s.id == id) {
            return false;
        }
        debug!("Panel: registered section {id}");
        self.sections.push(Section {
            id,
            title,
            icon,
            collapsed,
            update,
            markup: String::new(),
        });
        true
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Flip collapsed state; re-render immediately on expand.
    pub fn toggle(&mut self, id: &str, ctx: &RenderCtx) {
        if let Some(s) = self.sections.iter_mut().find(|s| s.id == id) {
            s.collapsed = !s.collapsed;
            if !s.collapsed {
                s.markup = (s.update)(ctx);
            }
        }
    }

    /// Re-render every expanded section. Collapsed ones keep their markup.
    pub fn update_expanded(&mut self, ctx: &RenderCtx) {
        for s in &mut self.sections {
            if !s.collapsed {
                s.markup = (s.update)(ctx);
            }
        }
    }
}

/// Key/value cell in the shared `scx-grid` markup.
pub(crate) fn kv(k: &str, v: &str) -> String {
    format!("<div><div class=\"scx-k\">{k}</div><div class=\"scx-v\">{v}</div></div>")
}

/// Standard registration set, in sidebar order.
pub fn register_default_sections(registry: &mut SectionRegistry) {
    registry.register(retail::SECTION_ID, "Retail Helper", "📦", false, retail::render);
    registry.register(
        financials::SECTION_ID,
        "Financials",
        "💰",
        true,
        financials::render,
    );
    registry.register(
        production::SECTION_ID,
        "Production Helper",
        "🏭",
        true,
        production::render,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(_: &RenderCtx) -> String {
        "rendered".to_string()
    }

    fn ctx_parts() -> (AppState, Document) {
        (AppState::new(), Document::new())
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut reg = SectionRegistry::new();
        assert!(reg.register("a", "A", "x", false, blank));
        assert!(!reg.register("a", "A", "x", false, blank));
        assert_eq!(reg.sections().len(), 1);
    }

    #[test]
    fn collapsed_sections_are_not_rerendered() {
        let (state, doc) = ctx_parts();
        let ctx = RenderCtx {
            state: &state,
            doc: &doc,
            selected_row: None,
            now: Instant::now(),
        };
        let mut reg = SectionRegistry::new();
        reg.register("a", "A", "x", true, blank);
        reg.update_expanded(&ctx);
        assert_eq!(reg.sections()[0].markup, "");

        reg.toggle("a", &ctx);
        assert_eq!(reg.sections()[0].markup, "rendered");
    }
}
