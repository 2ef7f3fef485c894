//! Derived layout state and the payloads published about it.
//!
//! [`LayoutMode`] is a value: the coordinator replaces it wholesale on every
//! viewport or sidebar change and never mutates it in place. Readers get a
//! clone that stays consistent however the layout moves on afterwards.

use serde::{Deserialize, Serialize};

use super::modes::{classify, ModeType, SidebarBehavior};
use crate::bus::{LayoutEvent, ACTIVE_PAGE_CHANGE, LAYOUT_MODE_CHANGE};
use crate::domain::{Breakpoints, SidebarConfig, ViewportSnapshot};

/// Sidebar geometry for a layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarState {
    /// Rendered width in pixels; `0` when hidden.
    pub width: u32,
    pub is_visible: bool,
}

/// Snapshot of the layout derived from the viewport and sidebar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMode {
    pub mode_type: ModeType,

    /// Sidebar collapsed on desktop. Always `false` outside the desktop bracket.
    pub is_compact: bool,

    pub is_mobile: bool,
    pub is_tablet: bool,

    /// True for both desktop variants.
    pub is_desktop: bool,

    pub viewport: ViewportSnapshot,
    pub sidebar: SidebarState,
    pub breakpoints: Breakpoints,
    pub sidebar_behavior: SidebarBehavior,
}

impl LayoutMode {
    /// Derives the layout for a viewport.
    ///
    /// `sidebar_compact` only has an effect in the desktop bracket, where it
    /// turns [`ModeType::Desktop`] into [`ModeType::DesktopCompact`].
    #[must_use]
    pub fn derive(
        viewport: ViewportSnapshot,
        breakpoints: Breakpoints,
        sidebar: SidebarConfig,
        sidebar_compact: bool,
    ) -> Self {
        let mode_type = match classify(viewport.width, &breakpoints) {
            ModeType::Desktop if sidebar_compact => ModeType::DesktopCompact,
            other => other,
        };

        let sidebar_state = match mode_type {
            ModeType::Mobile => SidebarState {
                width: 0,
                is_visible: false,
            },
            ModeType::Tablet | ModeType::DesktopCompact => SidebarState {
                width: sidebar.compact_width,
                is_visible: true,
            },
            ModeType::Desktop => SidebarState {
                width: sidebar.width,
                is_visible: true,
            },
        };

        Self {
            mode_type,
            is_compact: mode_type == ModeType::DesktopCompact,
            is_mobile: mode_type == ModeType::Mobile,
            is_tablet: mode_type == ModeType::Tablet,
            is_desktop: mode_type.is_desktop(),
            viewport,
            sidebar: sidebar_state,
            breakpoints,
            sidebar_behavior: SidebarBehavior::for_mode(mode_type),
        }
    }
}

/// Payload of a `layout-mode-change` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeChange {
    pub previous_mode_type: ModeType,
    pub mode_type: ModeType,
    pub viewport: ViewportSnapshot,
    pub is_compact: bool,
}

impl ModeChange {
    pub(crate) const fn between(previous: ModeType, current: &LayoutMode) -> Self {
        Self {
            previous_mode_type: previous,
            mode_type: current.mode_type,
            viewport: current.viewport,
            is_compact: current.is_compact,
        }
    }

    /// Decodes the payload of a subscribed `layout-mode-change` event.
    ///
    /// Returns `None` for other event types or malformed payloads.
    #[must_use]
    pub fn from_event(event: &LayoutEvent) -> Option<Self> {
        if event.event_type != LAYOUT_MODE_CHANGE {
            return None;
        }
        serde_json::from_value(event.data.clone()).ok()
    }
}

/// Payload of an `active-page-change` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePageChange {
    pub previous_page: Option<String>,
    pub current_page: Option<String>,
}

impl ActivePageChange {
    /// Decodes the payload of a subscribed `active-page-change` event.
    #[must_use]
    pub fn from_event(event: &LayoutEvent) -> Option<Self> {
        if event.event_type != ACTIVE_PAGE_CHANGE {
            return None;
        }
        serde_json::from_value(event.data.clone()).ok()
    }
}

/// Mutable coordinator state guarded by one mutex.
#[derive(Debug, Clone)]
pub(crate) struct LayoutState {
    pub(crate) viewport: ViewportSnapshot,
    pub(crate) mode: LayoutMode,
    pub(crate) sidebar_compact: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn derive(width: u32, compact: bool) -> LayoutMode {
        LayoutMode::derive(
            ViewportSnapshot::new(width, 800),
            Breakpoints::default(),
            SidebarConfig::default(),
            compact,
        )
    }

    #[test]
    fn mobile_hides_the_sidebar() {
        let mode = derive(375, false);
        assert_eq!(mode.mode_type, ModeType::Mobile);
        assert!(mode.is_mobile && !mode.is_tablet && !mode.is_desktop);
        assert_eq!(mode.sidebar, SidebarState { width: 0, is_visible: false });
        assert_eq!(mode.sidebar_behavior, SidebarBehavior::Overlay);
    }

    #[test]
    fn compact_flag_only_applies_on_desktop() {
        let tablet = derive(900, true);
        assert_eq!(tablet.mode_type, ModeType::Tablet);
        assert!(!tablet.is_compact);

        let desktop = derive(1440, true);
        assert_eq!(desktop.mode_type, ModeType::DesktopCompact);
        assert!(desktop.is_compact && desktop.is_desktop);
        assert_eq!(desktop.sidebar.width, 64);
        assert_eq!(desktop.sidebar_behavior, SidebarBehavior::Collapsed);
    }

    #[test]
    fn desktop_uses_full_sidebar_width() {
        let mode = derive(1280, false);
        assert_eq!(mode.sidebar, SidebarState { width: 260, is_visible: true });
        assert_eq!(mode.sidebar_behavior, SidebarBehavior::Fixed);
    }

    #[test]
    fn mode_change_round_trips_through_layout_event() {
        let change = ModeChange::between(ModeType::Tablet, &derive(1280, false));
        let data = serde_json::to_value(change).unwrap();
        assert_eq!(
            data,
            serde_json::json!({
                "previousModeType": "tablet",
                "modeType": "desktop",
                "viewport": { "width": 1280, "height": 800 },
                "isCompact": false,
            })
        );

        let event = LayoutEvent::new(LAYOUT_MODE_CHANGE, data.clone());
        assert_eq!(ModeChange::from_event(&event), Some(change));
        assert_eq!(ModeChange::from_event(&LayoutEvent::new("other", data)), None);
    }
}
