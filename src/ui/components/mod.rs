//! UI component renderers.
//!
//! - [`error_panel`]: Static degraded-mode error panel

pub mod error_panel;

pub use error_panel::render_error_panel;
