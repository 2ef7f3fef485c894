//! View model types for coordinator-produced UI.
//!
//! The coordinator renders exactly one piece of UI itself: the static error
//! panel that replaces the surface when [`fail`](crate::app::LayoutCoordinator::fail)
//! runs without a messages tray. Its view model is computed from the failure
//! and rendered by [`components::render_error_panel`](crate::ui::components::render_error_panel).

use crate::domain::Severity;

/// Display data for the degraded-mode error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    /// Panel heading.
    pub title: String,

    /// Short, user-facing explanation.
    pub message: String,

    /// Severity that selected the heading and copy.
    pub severity: Severity,

    /// Technical details (error text and source chain), shown collapsed.
    pub details: Option<String>,

    /// Label of the reload action button.
    pub reload_label: String,
}

impl ErrorPanel {
    /// Builds the panel for a failure message of the given severity.
    #[must_use]
    pub fn for_failure(severity: Severity, details: Option<String>) -> Self {
        let (title, message) = match severity {
            Severity::Critical => (
                "Application Error",
                "The application could not start correctly. Reloading the page usually fixes this.",
            ),
            Severity::Warning => (
                "Something went wrong",
                "Part of the application failed to load. You can keep working or reload the page.",
            ),
        };

        Self {
            title: title.to_string(),
            message: message.to_string(),
            severity,
            details,
            reload_label: "Reload".to_string(),
        }
    }

    /// Renders the panel as static markup.
    #[must_use]
    pub fn to_markup(&self) -> String {
        crate::ui::components::render_error_panel(self)
    }
}
