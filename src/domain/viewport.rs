//! Viewport snapshot and breakpoint types.

use serde::{Deserialize, Serialize};

/// Read-only viewport dimensions in CSS pixels.
///
/// Recomputed by the host on every raw resize notification. The coordinator
/// keeps the latest snapshot but only reacts with side effects when the derived
/// mode type changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
}

impl ViewportSnapshot {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Width thresholds separating the layout mode brackets.
///
/// Boundaries are inclusive on the lower mode: a width equal to `mobile` is
/// still mobile, a width equal to `tablet` is still tablet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    /// Largest width classified as mobile. Default: 768
    pub mobile: u32,
    /// Largest width classified as tablet. Default: 1024
    pub tablet: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile: 768,
            tablet: 1024,
        }
    }
}

/// Sidebar widths used when deriving a layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Expanded width in pixels. Default: 260
    pub width: u32,
    /// Collapsed width in pixels (tablet and compact desktop). Default: 64
    pub compact_width: u32,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            width: 260,
            compact_width: 64,
        }
    }
}
