//! Collaborator contracts for UI regions, the messages tray, and pages.
//!
//! Regions are singleton UI areas (header, footer, main content, sidebar,
//! messages tray) that construct themselves and then register into the
//! [`LayoutCoordinator`](crate::app::LayoutCoordinator). The coordinator holds
//! them by `Arc` back-reference only; their lifecycle stays with the caller.

use std::time::Duration;

/// A singleton UI area that registers into the coordinator.
///
/// Implementations call the matching `register_*` method on the coordinator
/// themselves, after their own construction has completed.
///
/// # Example
///
/// ```
/// use layout_core::Region;
///
/// struct Header;
///
/// impl Region for Header {
///     fn region_name(&self) -> &str {
///         "header"
///     }
/// }
/// ```
pub trait Region: Send + Sync {
    /// Human-readable region name used in log output.
    fn region_name(&self) -> &str;

    /// Performs region-internal setup.
    ///
    /// The coordinator never calls this; it is part of the contract between the
    /// host and its regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot finish its setup.
    fn init(&self) -> crate::Result<()> {
        Ok(())
    }

    /// Releases region-internal resources.
    fn destroy(&self) {}
}

/// Presentation options for a message shown in the messages tray.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageOptions {
    /// Keep the message visible until dismissed by the user.
    pub persistent: bool,
    /// Auto-dismiss delay; `None` uses the tray's own default.
    pub duration: Option<Duration>,
    /// Optional label for an action button (e.g. "Reload").
    pub action_label: Option<String>,
}

impl MessageOptions {
    /// Options for a message that stays until dismissed.
    #[must_use]
    pub const fn persistent() -> Self {
        Self {
            persistent: true,
            duration: None,
            action_label: None,
        }
    }
}

/// The notification tray region.
///
/// Used by [`LayoutCoordinator::fail`](crate::app::LayoutCoordinator::fail) to
/// surface a recoverable notice instead of replacing the whole surface.
pub trait MessagesTray: Region {
    fn show_error(&self, title: &str, description: Option<&str>, options: MessageOptions);
    fn show_warning(&self, title: &str, description: Option<&str>, options: MessageOptions);
    fn show_info(&self, title: &str, description: Option<&str>, options: MessageOptions);
    fn show_success(&self, title: &str, description: Option<&str>, options: MessageOptions);
}

/// A page component tracked as the active page.
///
/// The coordinator does not own pages; it keeps a back-reference to the
/// current one for hotkey and status coordination.
pub trait Page: Send + Sync {
    /// Stable page identifier (e.g. `"dashboard"`).
    fn page_name(&self) -> &str;
}
