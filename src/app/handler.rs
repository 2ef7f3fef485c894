//! Host event handling.
//!
//! Hosts forward their raw notifications here instead of calling coordinator
//! methods piecemeal. Each event maps onto one coordinator operation; the
//! return value reports whether the layout mode type changed.
//!
//! # Example
//!
//! ```rust
//! use layout_core::app::{handle_event, Event, LayoutCoordinator, ManualViewport, ModeType};
//! use layout_core::ui::InMemorySurface;
//! use layout_core::Config;
//! use std::sync::Arc;
//!
//! let coordinator = LayoutCoordinator::new(
//!     Config::default(),
//!     Arc::new(InMemorySurface::new()),
//!     Arc::new(ManualViewport::new(1280, 800)),
//! )?;
//!
//! let change = handle_event(&coordinator, &Event::Resize { width: 600, height: 800 });
//! assert_eq!(change.map(|c| c.mode_type), Some(ModeType::Mobile));
//! # Ok::<(), layout_core::LayoutError>(())
//! ```

use crate::app::state::ModeChange;
use crate::app::LayoutCoordinator;
use crate::domain::ViewportSnapshot;

/// Notifications a host forwards to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Raw resize with the new viewport dimensions.
    ///
    /// Hosts that feed a [`ViewportSource`](crate::app::ViewportSource) do not
    /// need to send this; the observer debounces those updates itself.
    Resize {
        width: u32,
        height: u32,
    },

    /// The document became visible or hidden.
    ///
    /// Becoming visible re-reads the viewport, since resizes may have been
    /// missed while hidden.
    VisibilityChange {
        visible: bool,
    },

    /// The user collapsed or expanded the sidebar.
    SidebarCompact(bool),
}

/// Applies a host event to the coordinator.
///
/// Returns the mode change the event caused, if any.
pub fn handle_event(coordinator: &LayoutCoordinator, event: &Event) -> Option<ModeChange> {
    tracing::trace!(?event, "handling host event");

    match *event {
        Event::Resize { width, height } => coordinator.handle_viewport_change(ViewportSnapshot::new(width, height)),
        Event::VisibilityChange { visible: true } => coordinator.refresh_viewport(),
        Event::VisibilityChange { visible: false } => None,
        Event::SidebarCompact(compact) => coordinator.set_sidebar_compact(compact),
    }
}
