//! Layout coordination core for single-page applications.
//!
//! The crate turns raw viewport dimensions into a stable layout-mode state
//! machine, keeps a registry of singleton UI regions, and lets those regions
//! talk through an event bus without depending on each other's construction
//! order:
//!
//! - A **layout coordinator** classifies the viewport into mobile, tablet,
//!   desktop and compact desktop modes and reacts only when the mode type
//!   changes
//! - An **event bus** offers broadcast, single-consumer, and request/response
//!   delivery, each deferred to a later scheduler turn
//! - **Component references** resolve regions lazily, retrying until they
//!   register or a timeout fires
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host (browser shell, test harness, headless app)   │  ← ViewportSource,
//! └─────────────────────────────────────────────────────┘    RenderSurface
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Mode classification                              │
//! │  - Layout coordinator + region registry             │
//! │  - Viewport observer, host events                   │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Bus Layer     │   │ References    │
//! │ (ui/)         │   │ (bus/)        │   │ (reference/)  │
//! │ - Surface port│   │ - publish     │   │ - Retry loop  │
//! │ - Error panel │   │ - send        │   │ - Single      │
//! │               │   │ - request     │   │   flight      │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Paths, lock helpers (infrastructure/)            │
//! │  - Error types, viewport, region contracts (domain/)│
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - tracing subscriber, OTLP JSON file export        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! Hosts either pass string key/value pairs ([`Config::from_map`]) or a TOML
//! file ([`Config::from_file`]):
//!
//! ```toml
//! resize_debounce_ms = 100
//! trace_level = "debug"
//!
//! [breakpoints]
//! mobile = 768
//! tablet = 1024
//!
//! [sidebar]
//! width = 260
//! compact_width = 64
//! ```
//!
//! # Example
//!
//! ```rust
//! use layout_core::app::{ManualViewport, ModeType};
//! use layout_core::ui::InMemorySurface;
//! use layout_core::{initialize, Config};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> layout_core::Result<()> {
//! let viewport = Arc::new(ManualViewport::new(1280, 800));
//! let coordinator = initialize(Config::default(), Arc::new(InMemorySurface::new()), viewport)?;
//!
//! assert_eq!(coordinator.mode_type(), ModeType::Desktop);
//! coordinator.destroy();
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod bus;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod reference;
pub mod ui;

pub use app::{handle_event, Event, LayoutCoordinator, LayoutMode, ModeChange, ModeType, Subscription};
pub use bus::{BusConfig, EventBus, LayoutEvent};
pub use domain::{
    Breakpoints, LayoutError, MessageOptions, MessagesTray, Page, Region, RequestError, Result, Severity,
    SidebarConfig, ViewportSnapshot,
};
pub use reference::{ComponentReference, ReferenceConfig};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app::ViewportSource;
use crate::ui::RenderSurface;

/// Layout core configuration.
///
/// Every field has a default; missing TOML keys and unparsable map values fall
/// back to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mode thresholds. Default: 768 / 1024
    pub breakpoints: Breakpoints,

    /// Sidebar widths. Default: 260 / 64
    pub sidebar: SidebarConfig,

    /// Quiet period before a burst of resizes is applied. Default: 100
    pub resize_debounce_ms: u64,

    /// Viewport polling period when resize notifications are unavailable.
    /// Default: 500
    pub poll_interval_ms: u64,

    /// Event bus limits.
    pub bus: BusSettings,

    /// Defaults for coordinator-created component references.
    pub reference: ReferenceSettings,

    /// Log filter directive used when `RUST_LOG` is unset.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any
    /// `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// OTLP JSON trace file. Relative paths land in the data directory.
    /// Default: none (no span export)
    pub trace_file: Option<String>,
}

/// Event bus section of [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// `0` means unlimited. Default: 0
    pub max_consumers_per_event: usize,
    /// Default: 5000
    pub request_timeout_ms: u64,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            max_consumers_per_event: 0,
            request_timeout_ms: 5000,
        }
    }
}

/// Component reference section of [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Default: 100
    pub retry_interval_ms: u64,
    /// Default: 20
    pub max_retries: u32,
    /// Default: 5000
    pub timeout_ms: u64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            retry_interval_ms: 100,
            max_retries: 20,
            timeout_ms: 5000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            sidebar: SidebarConfig::default(),
            resize_debounce_ms: 100,
            poll_interval_ms: 500,
            bus: BusSettings::default(),
            reference: ReferenceSettings::default(),
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses configuration from host-provided key/value pairs.
    ///
    /// Unknown keys are ignored. A value that does not parse falls back to the
    /// default for that key only.
    ///
    /// # Keys
    ///
    /// - `mobile_breakpoint`, `tablet_breakpoint`
    /// - `sidebar_width`, `sidebar_compact_width`
    /// - `resize_debounce_ms`, `poll_interval_ms`
    /// - `max_consumers_per_event`, `request_timeout_ms`
    /// - `retry_interval_ms`, `max_retries`, `reference_timeout_ms`
    /// - `trace_level`, `trace_file`
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use layout_core::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("mobile_breakpoint".to_string(), "600".to_string());
    /// map.insert("request_timeout_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.breakpoints.mobile, 600);
    /// assert_eq!(config.bus.request_timeout_ms, 5000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        fn parsed<T: std::str::FromStr>(map: &BTreeMap<String, String>, key: &str, default: T) -> T {
            map.get(key)
                .and_then(|raw| {
                    let value = raw.trim().parse::<T>().ok();
                    if value.is_none() {
                        tracing::debug!(key, value = %raw, "invalid configuration value, using default");
                    }
                    value
                })
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let text = |key: &str| map.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            breakpoints: Breakpoints {
                mobile: parsed(map, "mobile_breakpoint", defaults.breakpoints.mobile),
                tablet: parsed(map, "tablet_breakpoint", defaults.breakpoints.tablet),
            },
            sidebar: SidebarConfig {
                width: parsed(map, "sidebar_width", defaults.sidebar.width),
                compact_width: parsed(map, "sidebar_compact_width", defaults.sidebar.compact_width),
            },
            resize_debounce_ms: parsed(map, "resize_debounce_ms", defaults.resize_debounce_ms),
            poll_interval_ms: parsed(map, "poll_interval_ms", defaults.poll_interval_ms),
            bus: BusSettings {
                max_consumers_per_event: parsed(map, "max_consumers_per_event", defaults.bus.max_consumers_per_event),
                request_timeout_ms: parsed(map, "request_timeout_ms", defaults.bus.request_timeout_ms),
            },
            reference: ReferenceSettings {
                retry_interval_ms: parsed(map, "retry_interval_ms", defaults.reference.retry_interval_ms),
                max_retries: parsed(map, "max_retries", defaults.reference.max_retries),
                timeout_ms: parsed(map, "reference_timeout_ms", defaults.reference.timeout_ms),
            },
            trace_level: text("trace_level"),
            trace_file: text("trace_file"),
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Io`] when the file cannot be read and
    /// [`LayoutError::ConfigParse`] when it is not valid TOML for this shape.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks value combinations that defaults cannot repair.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Config`] when the mobile breakpoint is not below
    /// the tablet breakpoint, or when an interval or timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.breakpoints.mobile >= self.breakpoints.tablet {
            return Err(LayoutError::Config(format!(
                "mobile breakpoint ({}) must be below tablet breakpoint ({})",
                self.breakpoints.mobile, self.breakpoints.tablet
            )));
        }
        if self.reference.retry_interval_ms == 0 {
            return Err(LayoutError::Config("retry_interval_ms must be greater than zero".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(LayoutError::Config("poll_interval_ms must be greater than zero".to_string()));
        }
        if self.bus.request_timeout_ms == 0 || self.reference.timeout_ms == 0 {
            return Err(LayoutError::Config("timeouts must be greater than zero".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn bus_config(&self) -> BusConfig {
        BusConfig {
            max_consumers_per_event: self.bus.max_consumers_per_event,
            request_timeout: Duration::from_millis(self.bus.request_timeout_ms),
        }
    }

    #[must_use]
    pub const fn reference_config(&self) -> ReferenceConfig {
        ReferenceConfig {
            retry_interval: Duration::from_millis(self.reference.retry_interval_ms),
            max_retries: self.reference.max_retries,
            timeout: Duration::from_millis(self.reference.timeout_ms),
        }
    }
}

/// Bootstraps the layout core.
///
/// Installs the tracing subscriber (first call only), validates `config`,
/// creates the coordinator, and runs [`LayoutCoordinator::init`]. Call it from
/// inside a Tokio runtime so the viewport observer can start.
///
/// # Errors
///
/// Returns [`LayoutError::Config`] when the configuration does not validate.
pub fn initialize(
    config: Config,
    surface: Arc<dyn RenderSurface>,
    source: Arc<dyn ViewportSource>,
) -> Result<Arc<LayoutCoordinator>> {
    observability::init_tracing(&config);
    tracing::debug!("initializing layout core");

    let coordinator = LayoutCoordinator::new(config, surface, source)?;
    coordinator.init();
    Ok(coordinator)
}
