//! Rendering surface layer.
//!
//! This module defines the output port the coordinator writes layout side
//! effects to, an in-memory implementation of it, and the one piece of UI the
//! coordinator renders itself (the degraded-mode error panel).
//!
//! # Architecture
//!
//! ```text
//! LayoutCoordinator → Vec<Action> → RenderSurface (host) / InMemorySurface
//!                          └─ fail() → ErrorPanel → render_error_panel → markup
//! ```
//!
//! # Modules
//!
//! - [`surface`]: The [`RenderSurface`] trait and addressable nodes
//! - [`memory`]: [`InMemorySurface`], a recording surface
//! - [`viewmodel`]: [`ErrorPanel`] view model
//! - [`components`]: Markup renderers
//! - [`helpers`]: Escaping utilities

pub mod components;
pub mod helpers;
pub mod memory;
pub mod surface;
pub mod viewmodel;

pub use memory::InMemorySurface;
pub use surface::{RenderSurface, SurfaceNode};
pub use viewmodel::ErrorPanel;
