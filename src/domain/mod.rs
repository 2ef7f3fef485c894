//! Domain layer for the layout coordination core.
//!
//! This module holds the value types and collaborator contracts that every other
//! layer speaks in: viewport snapshots, breakpoints, the region traits that UI
//! areas implement to register with the coordinator, and the error types.
//! Nothing here depends on the async runtime or on the rendering surface.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`region`]: Collaborator traits (regions, messages tray, pages)
//! - [`viewport`]: Viewport snapshot and breakpoint configuration
//!
//! # Examples
//!
//! ```
//! use layout_core::domain::{Breakpoints, ViewportSnapshot};
//!
//! let viewport = ViewportSnapshot::new(800, 600);
//! assert!(viewport.width > Breakpoints::default().mobile);
//! ```

pub mod error;
pub mod region;
pub mod viewport;

pub use error::{LayoutError, RequestError, Result, Severity};
pub use region::{MessageOptions, MessagesTray, Page, Region};
pub use viewport::{Breakpoints, SidebarConfig, ViewportSnapshot};
