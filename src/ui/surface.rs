//! Rendering surface abstraction.
//!
//! The coordinator never touches a DOM directly. It writes style variables,
//! toggles class names, and in degraded mode replaces the visible contents
//! through this trait; the host maps those calls onto its real rendering tree.

use crate::ui::viewmodel::ErrorPanel;

/// Node of the rendering tree the coordinator addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceNode {
    /// Global body-equivalent node.
    Body,
    /// The layout container element.
    LayoutRoot,
}

impl SurfaceNode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::LayoutRoot => "layout-root",
        }
    }
}

/// Output port for layout side effects.
///
/// Implementations must be cheap and non-blocking; they are called while the
/// coordinator applies a mode transition.
pub trait RenderSurface: Send + Sync {
    /// Sets a named style variable (e.g. `--sidebar-width`) on the root node.
    fn set_style_variable(&self, name: &str, value: &str);

    /// Adds (`enabled = true`) or removes a class name on `node`.
    fn toggle_class(&self, node: SurfaceNode, class: &str, enabled: bool);

    /// Replaces the entire visible surface with a static error panel.
    ///
    /// Only used by [`LayoutCoordinator::fail`](crate::app::LayoutCoordinator::fail)
    /// when no messages tray is registered.
    fn replace_contents(&self, panel: &ErrorPanel);
}
