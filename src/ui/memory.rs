//! In-memory rendering surface.
//!
//! Records the style variables, class sets, and replacement markup the
//! coordinator produces. Useful for headless hosts and for asserting layout
//! side effects in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::infrastructure::sync::lock;
use crate::ui::components::render_error_panel;
use crate::ui::surface::{RenderSurface, SurfaceNode};
use crate::ui::viewmodel::ErrorPanel;

#[derive(Debug, Default)]
struct SurfaceState {
    variables: BTreeMap<String, String>,
    classes: BTreeMap<SurfaceNode, BTreeSet<String>>,
    replaced: Option<String>,
    writes: usize,
}

/// A [`RenderSurface`] that keeps its state in memory.
///
/// # Example
///
/// ```
/// use layout_core::ui::{InMemorySurface, RenderSurface, SurfaceNode};
///
/// let surface = InMemorySurface::new();
/// surface.set_style_variable("--sidebar-width", "260px");
/// surface.toggle_class(SurfaceNode::Body, "layout-desktop", true);
///
/// assert_eq!(surface.style_variable("--sidebar-width").as_deref(), Some("260px"));
/// assert!(surface.has_class(SurfaceNode::Body, "layout-desktop"));
/// ```
#[derive(Debug, Default)]
pub struct InMemorySurface {
    state: Mutex<SurfaceState>,
}

impl InMemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn style_variable(&self, name: &str) -> Option<String> {
        lock(&self.state).variables.get(name).cloned()
    }

    #[must_use]
    pub fn has_class(&self, node: SurfaceNode, class: &str) -> bool {
        lock(&self.state)
            .classes
            .get(&node)
            .is_some_and(|set| set.contains(class))
    }

    /// Class names currently set on `node`, sorted.
    #[must_use]
    pub fn classes(&self, node: SurfaceNode) -> Vec<String> {
        lock(&self.state)
            .classes
            .get(&node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Markup written by the last `replace_contents` call, if any.
    #[must_use]
    pub fn replaced_contents(&self) -> Option<String> {
        lock(&self.state).replaced.clone()
    }

    /// Number of style variable writes and class toggles applied so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        lock(&self.state).writes
    }
}

impl RenderSurface for InMemorySurface {
    fn set_style_variable(&self, name: &str, value: &str) {
        let mut state = lock(&self.state);
        state.variables.insert(name.to_string(), value.to_string());
        state.writes += 1;
    }

    fn toggle_class(&self, node: SurfaceNode, class: &str, enabled: bool) {
        let mut state = lock(&self.state);
        let set = state.classes.entry(node).or_default();
        if enabled {
            set.insert(class.to_string());
        } else {
            set.remove(class);
        }
        state.writes += 1;
    }

    fn replace_contents(&self, panel: &ErrorPanel) {
        lock(&self.state).replaced = Some(render_error_panel(panel));
    }
}
