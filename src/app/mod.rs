//! Application layer: the layout state machine and its coordinator.
//!
//! # Architecture
//!
//! Host notifications flow one way through the layer:
//!
//! ```text
//! ViewportSource / host Event → LayoutCoordinator → LayoutMode (replaced)
//!                                        │
//!                       mode type changed? ──► Vec<Action> → RenderSurface
//!                                        └───► layout-mode-change → EventBus
//! ```
//!
//! # Modules
//!
//! - [`modes`]: Mode types and the width classifier
//! - [`state`]: Derived [`LayoutMode`] and event payloads
//! - [`actions`]: Surface writes
//! - [`registry`]: Region slots
//! - [`observer`]: Viewport watching with polling fallback
//! - [`failure`]: Severity classification for `fail()`
//! - [`coordinator`]: The [`LayoutCoordinator`]
//! - [`handler`]: Host event entry point

pub mod actions;
pub mod coordinator;
pub mod failure;
pub mod handler;
pub mod modes;
pub mod observer;
pub mod registry;
pub mod state;

pub use actions::{apply_actions, mode_transition_actions, Action};
pub use coordinator::{LayoutCoordinator, Subscription};
pub use failure::{keyword_severity, SeverityClassifier};
pub use handler::{handle_event, Event};
pub use modes::{classify, ModeType, SidebarBehavior};
pub use observer::{ManualViewport, ObserverMode, ViewportSource};
pub use registry::{ComponentRegistry, Registered, Slot};
pub use state::{ActivePageChange, LayoutMode, ModeChange, SidebarState};
