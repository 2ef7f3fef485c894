//! Layout mode types and the width classifier.
//!
//! The layout moves between four mode types. Three of them follow directly
//! from the viewport width; the fourth, [`ModeType::DesktopCompact`], is the
//! desktop bracket with the sidebar collapsed by the user.
//!
//! ```text
//!        width ≤ mobile        mobile < width ≤ tablet        width > tablet
//!   ┌────────────────────┬──────────────────────────────┬───────────────────────┐
//!   │       Mobile       │            Tablet            │  Desktop ⇄ Desktop-   │
//!   │                    │                              │            Compact    │
//!   └────────────────────┴──────────────────────────────┴───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use layout_core::app::modes::{classify, ModeType};
//! use layout_core::Breakpoints;
//!
//! let breakpoints = Breakpoints::default();
//! assert_eq!(classify(768, &breakpoints), ModeType::Mobile);
//! assert_eq!(classify(769, &breakpoints), ModeType::Tablet);
//! assert_eq!(classify(1025, &breakpoints), ModeType::Desktop);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Breakpoints;

/// Discrete layout mode.
///
/// Serialized in kebab-case (`"desktop-compact"`), which is also the form used
/// in `layout-mode-change` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeType {
    /// Narrow viewports. The sidebar is hidden and opens as an overlay.
    Mobile,

    /// Medium viewports. The sidebar shows as a collapsed rail.
    Tablet,

    /// Wide viewports with the full sidebar.
    Desktop,

    /// Wide viewports with the sidebar collapsed on request.
    DesktopCompact,
}

impl ModeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
            Self::DesktopCompact => "desktop-compact",
        }
    }

    /// True for both desktop variants.
    #[must_use]
    pub const fn is_desktop(self) -> bool {
        matches!(self, Self::Desktop | Self::DesktopCompact)
    }
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the sidebar participates in the layout for a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SidebarBehavior {
    /// Hidden; slides over the content when opened.
    Overlay,
    /// Narrow icon rail.
    Collapsed,
    /// Full width, always visible.
    Fixed,
}

impl SidebarBehavior {
    #[must_use]
    pub const fn for_mode(mode_type: ModeType) -> Self {
        match mode_type {
            ModeType::Mobile => Self::Overlay,
            ModeType::Tablet | ModeType::DesktopCompact => Self::Collapsed,
            ModeType::Desktop => Self::Fixed,
        }
    }
}

/// Classifies a viewport width into a mode bracket.
///
/// Total over all widths. Boundaries belong to the narrower bracket. Never
/// returns [`ModeType::DesktopCompact`]; compactness is applied on top by
/// [`LayoutMode::derive`](super::state::LayoutMode::derive).
#[must_use]
pub const fn classify(width: u32, breakpoints: &Breakpoints) -> ModeType {
    if width <= breakpoints.mobile {
        ModeType::Mobile
    } else if width <= breakpoints.tablet {
        ModeType::Tablet
    } else {
        ModeType::Desktop
    }
}
