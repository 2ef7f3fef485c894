//! Surface writes produced by the coordinator.
//!
//! Layout side effects are computed as a `Vec<Action>` first and applied to
//! the [`RenderSurface`] afterwards, so the decision of *what* to write stays
//! separate from the host-specific *how*.

use crate::app::state::LayoutMode;
use crate::ui::surface::{RenderSurface, SurfaceNode};
use crate::ui::viewmodel::ErrorPanel;

/// Style variable carrying the sidebar width (`"260px"`).
pub const SIDEBAR_WIDTH_VAR: &str = "--sidebar-width";

/// Mode flags written as `"1"` / `"0"` style variables, paired with the class
/// toggled on the layout root and body nodes.
const MODE_FLAGS: [(&str, &str); 4] = [
    ("--layout-compact", "layout-compact"),
    ("--layout-mobile", "layout-mobile"),
    ("--layout-tablet", "layout-tablet"),
    ("--layout-desktop", "layout-desktop"),
];

/// Nodes that carry the mode classes.
const MODE_CLASS_NODES: [SurfaceNode; 2] = [SurfaceNode::LayoutRoot, SurfaceNode::Body];

/// A single write to the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sets a named style variable on the root node.
    SetStyleVariable {
        name: String,
        value: String,
    },

    /// Adds (`enabled`) or removes a class on a node.
    ToggleClass {
        node: SurfaceNode,
        class: String,
        enabled: bool,
    },

    /// Replaces the surface contents with the static error panel.
    ReplaceContents(ErrorPanel),
}

/// Writes that bring the surface in line with `mode`.
///
/// Every mode flag is written on every transition, including the ones that
/// turn off, so the surface never keeps a stale class.
#[must_use]
pub fn mode_transition_actions(mode: &LayoutMode) -> Vec<Action> {
    let flags = [mode.is_compact, mode.is_mobile, mode.is_tablet, mode.is_desktop];

    let mut actions = Vec::with_capacity(1 + MODE_FLAGS.len() * (1 + MODE_CLASS_NODES.len()));
    actions.push(Action::SetStyleVariable {
        name: SIDEBAR_WIDTH_VAR.to_string(),
        value: format!("{}px", mode.sidebar.width),
    });

    for ((variable, _), enabled) in MODE_FLAGS.iter().zip(flags) {
        actions.push(Action::SetStyleVariable {
            name: (*variable).to_string(),
            value: (if enabled { "1" } else { "0" }).to_string(),
        });
    }

    for node in MODE_CLASS_NODES {
        for ((_, class), enabled) in MODE_FLAGS.iter().zip(flags) {
            actions.push(Action::ToggleClass {
                node,
                class: (*class).to_string(),
                enabled,
            });
        }
    }

    actions
}

/// Applies actions to the surface in order.
pub fn apply_actions(surface: &dyn RenderSurface, actions: &[Action]) {
    for action in actions {
        match action {
            Action::SetStyleVariable { name, value } => surface.set_style_variable(name, value),
            Action::ToggleClass { node, class, enabled } => {
                tracing::trace!(node = node.as_str(), class = %class, enabled = *enabled, "toggle class");
                surface.toggle_class(*node, class, *enabled);
            }
            Action::ReplaceContents(panel) => surface.replace_contents(panel),
        }
    }
    tracing::trace!(count = actions.len(), "surface actions applied");
}
