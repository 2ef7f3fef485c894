//! The layout coordinator.
//!
//! One coordinator owns the viewport, the derived [`LayoutMode`], the region
//! registry, the event bus, the active page, and the failure flag. It is an
//! explicit context object: hosts create it once and hand `Arc` clones to the
//! regions that need it.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► init ──► (viewport changes, registrations, events) ──► destroy
//!           │                                                      ▲
//!           └──────────────── fail (degraded, still running) ──────┘
//! ```

use serde_json::{json, Value};
use std::error::Error;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use super::actions::{apply_actions, mode_transition_actions, Action};
use super::failure::{error_details, keyword_severity, SeverityClassifier};
use super::modes::ModeType;
use super::observer::{self, ObserverMode, ViewportSource};
use super::registry::{ComponentRegistry, Registered, Slot};
use super::state::{ActivePageChange, LayoutMode, LayoutState, ModeChange};
use crate::bus::{Consumer, EventBus, LayoutEvent, ACTIVE_PAGE_CHANGE, LAYOUT_FAILED, LAYOUT_MODE_CHANGE, LAYOUT_READY};
use crate::domain::{MessageOptions, MessagesTray, Page, Region, Result, Severity, ViewportSnapshot};
use crate::infrastructure::sync::lock;
use crate::reference::ComponentReference;
use crate::ui::surface::RenderSurface;
use crate::ui::viewmodel::ErrorPanel;
use crate::Config;

/// Handle returned by [`LayoutCoordinator::subscribe`].
///
/// Dropping it keeps the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to stop deliveries.
#[derive(Debug, Clone)]
pub struct Subscription {
    consumer: Consumer,
}

impl Subscription {
    /// Stops further deliveries. Idempotent.
    pub fn unsubscribe(&self) {
        self.consumer.unregister();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.consumer.is_active()
    }

    #[must_use]
    pub fn event(&self) -> &str {
        self.consumer.event()
    }
}

/// Central layout state machine and region registry.
pub struct LayoutCoordinator {
    config: Config,
    surface: Arc<dyn RenderSurface>,
    source: Arc<dyn ViewportSource>,
    bus: EventBus,
    state: Mutex<LayoutState>,
    /// Held from derive through surface writes and emit, so concurrent
    /// transitions land on the surface in the order they were derived.
    transitions: Mutex<()>,
    registry: Mutex<ComponentRegistry>,
    active_page: Mutex<Option<Arc<dyn Page>>>,
    severity: Mutex<SeverityClassifier>,
    observer: Mutex<Option<JoinHandle<()>>>,
    observer_mode: Mutex<Option<ObserverMode>>,
    initialized: AtomicBool,
    ready: AtomicBool,
    failed: AtomicBool,
}

macro_rules! region_slots {
    ($($slot:ident => $register:ident, $getter:ident, $reference:ident;)*) => {
        impl LayoutCoordinator {
            $(
                #[doc = concat!("Registers the `", stringify!($getter), "` region, replacing any previous instance.")]
                pub fn $register(&self, region: Arc<dyn Region>) {
                    self.register(Slot::$slot, Registered::Region(region));
                }

                #[doc = concat!("The registered `", stringify!($getter), "` region, if any.")]
                #[must_use]
                pub fn $getter(&self) -> Option<Arc<dyn Region>> {
                    match self.region(Slot::$slot) {
                        Some(Registered::Region(region)) => Some(region),
                        _ => None,
                    }
                }

                #[doc = concat!("A retrying reference to the `", stringify!($getter), "` region.")]
                #[must_use]
                pub fn $reference(self: &Arc<Self>) -> ComponentReference<Arc<dyn Region>> {
                    let coordinator = Arc::downgrade(self);
                    self.reference(Slot::$slot.as_str(), move || {
                        coordinator.upgrade().and_then(|c| c.$getter())
                    })
                }
            )*
        }
    };
}

region_slots! {
    Header => register_header, header, header_ref;
    Footer => register_footer, footer, footer_ref;
    MainContent => register_main_content, main_content, main_content_ref;
    Sidebar => register_sidebar, sidebar, sidebar_ref;
}

impl LayoutCoordinator {
    /// Creates a coordinator from the source's current viewport.
    ///
    /// Nothing is written to the surface and no observer runs until
    /// [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Config`](crate::LayoutError::Config) when the
    /// configuration does not validate.
    pub fn new(
        config: Config,
        surface: Arc<dyn RenderSurface>,
        source: Arc<dyn ViewportSource>,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let default_classifier: SeverityClassifier = Arc::new(keyword_severity);
        let viewport = source.current();
        let mode = LayoutMode::derive(viewport, config.breakpoints, config.sidebar, false);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            mode_type = %mode.mode_type,
            "layout coordinator created"
        );

        Ok(Arc::new(Self {
            bus: EventBus::new(config.bus_config()),
            config,
            surface,
            source,
            state: Mutex::new(LayoutState {
                viewport,
                mode,
                sidebar_compact: false,
            }),
            transitions: Mutex::new(()),
            registry: Mutex::new(ComponentRegistry::new()),
            active_page: Mutex::new(None),
            severity: Mutex::new(default_classifier),
            observer: Mutex::new(None),
            observer_mode: Mutex::new(None),
            initialized: AtomicBool::new(false),
            ready: AtomicBool::new(false),
            failed: AtomicBool::new(false),
        }))
    }

    /// Writes the initial layout to the surface and starts viewport observation.
    ///
    /// Runs once; later calls are ignored. Emits no `layout-mode-change`.
    /// Must be called inside a Tokio runtime for the observer to start.
    pub fn init(self: &Arc<Self>) -> ObserverMode {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return lock(&self.observer_mode).unwrap_or(ObserverMode::Detached);
        }

        let mode = {
            let _serial = lock(&self.transitions);
            let mode = self.layout_mode();
            apply_actions(self.surface.as_ref(), &mode_transition_actions(&mode));
            mode
        };

        let (observer_mode, task) = observer::start(
            Arc::downgrade(self),
            Arc::clone(&self.source),
            self.config.resize_debounce(),
            self.config.poll_interval(),
        );
        *lock(&self.observer) = task;
        *lock(&self.observer_mode) = Some(observer_mode);

        tracing::info!(mode_type = %mode.mode_type, observer = ?observer_mode, "layout initialized");
        observer_mode
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// How the viewport is being observed, once [`init`](Self::init) ran.
    #[must_use]
    pub fn observer_mode(&self) -> Option<ObserverMode> {
        *lock(&self.observer_mode)
    }

    // -- mode reads --------------------------------------------------------

    #[must_use]
    pub fn mode_type(&self) -> ModeType {
        lock(&self.state).mode.mode_type
    }

    #[must_use]
    pub fn is_layout_mobile(&self) -> bool {
        lock(&self.state).mode.is_mobile
    }

    #[must_use]
    pub fn is_layout_tablet(&self) -> bool {
        lock(&self.state).mode.is_tablet
    }

    /// True for both desktop variants.
    #[must_use]
    pub fn is_layout_desktop(&self) -> bool {
        lock(&self.state).mode.is_desktop
    }

    /// Snapshot of the current layout mode.
    #[must_use]
    pub fn layout_mode(&self) -> LayoutMode {
        lock(&self.state).mode.clone()
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportSnapshot {
        lock(&self.state).viewport
    }

    // -- mode transitions --------------------------------------------------

    /// Re-derives the layout for `snapshot`.
    ///
    /// The layout mode is always replaced. Surface writes and the
    /// `layout-mode-change` event only happen when the mode type changed, in
    /// which case the change is returned.
    pub fn handle_viewport_change(&self, snapshot: ViewportSnapshot) -> Option<ModeChange> {
        self.transition(|state| state.viewport = snapshot)
    }

    /// Re-reads the viewport from the source.
    pub fn refresh_viewport(&self) -> Option<ModeChange> {
        let snapshot = self.source.current();
        self.handle_viewport_change(snapshot)
    }

    /// Collapses or expands the sidebar. Only changes the mode on desktop.
    pub fn set_sidebar_compact(&self, compact: bool) -> Option<ModeChange> {
        self.transition(|state| state.sidebar_compact = compact)
    }

    #[must_use]
    pub fn is_sidebar_compact(&self) -> bool {
        lock(&self.state).sidebar_compact
    }

    fn transition(&self, update: impl FnOnce(&mut LayoutState)) -> Option<ModeChange> {
        let _serial = lock(&self.transitions);
        let (previous, mode) = {
            let mut state = lock(&self.state);
            update(&mut *state);
            let previous = state.mode.mode_type;
            state.mode = LayoutMode::derive(
                state.viewport,
                self.config.breakpoints,
                self.config.sidebar,
                state.sidebar_compact,
            );
            if state.mode.mode_type == previous {
                tracing::trace!(width = state.viewport.width, mode_type = %previous, "layout mode unchanged");
                return None;
            }
            (previous, state.mode.clone())
        };

        let change = ModeChange::between(previous, &mode);
        let _span = tracing::debug_span!(
            "mode_change",
            from = %previous,
            to = %mode.mode_type,
            width = mode.viewport.width
        )
        .entered();

        apply_actions(self.surface.as_ref(), &mode_transition_actions(&mode));
        match serde_json::to_value(change) {
            Ok(data) => self.emit(LAYOUT_MODE_CHANGE, data),
            Err(error) => tracing::error!(error = %error, "failed to encode mode change"),
        }

        tracing::debug!("layout mode changed");
        Some(change)
    }

    // -- registry ----------------------------------------------------------

    /// Registers the messages tray, replacing any previous instance.
    pub fn register_messages(&self, tray: Arc<dyn MessagesTray>) {
        self.register(Slot::Messages, Registered::Messages(tray));
    }

    /// The registered messages tray, if any.
    #[must_use]
    pub fn messages(&self) -> Option<Arc<dyn MessagesTray>> {
        match self.region(Slot::Messages) {
            Some(Registered::Messages(tray)) => Some(tray),
            _ => None,
        }
    }

    /// A retrying reference to the messages tray.
    #[must_use]
    pub fn messages_ref(self: &Arc<Self>) -> ComponentReference<Arc<dyn MessagesTray>> {
        let coordinator = Arc::downgrade(self);
        self.reference(Slot::Messages.as_str(), move || {
            coordinator.upgrade().and_then(|c| c.messages())
        })
    }

    /// The instance held in `slot`, if any.
    #[must_use]
    pub fn region(&self, slot: Slot) -> Option<Registered> {
        lock(&self.registry).get(slot).cloned()
    }

    /// True when header, footer, main content and messages are registered.
    #[must_use]
    pub fn are_all_components_registered(&self) -> bool {
        lock(&self.registry).is_complete()
    }

    fn register(&self, slot: Slot, instance: Registered) {
        let name = instance.name().to_string();
        let previous = lock(&self.registry).insert(slot, instance);

        match previous {
            Some(previous) => tracing::warn!(
                slot = slot.as_str(),
                previous = previous.name(),
                replacement = %name,
                "region already registered, replacing"
            ),
            None => tracing::debug!(slot = slot.as_str(), region = %name, "region registered"),
        }
    }

    /// Builds a reference over `resolver` with the configured retry budget.
    #[must_use]
    pub fn reference<T, F>(&self, name: &str, resolver: F) -> ComponentReference<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        ComponentReference::new(name, resolver, self.config.reference_config())
    }

    // -- events ------------------------------------------------------------

    /// The coordinator's event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Emits `layout-ready`. Only the first call has an effect.
    ///
    /// Returns `true` for the call that emitted the event.
    pub fn mark_ready(&self) -> bool {
        if self.ready.swap(true, Ordering::SeqCst) {
            tracing::debug!("layout already marked ready");
            return false;
        }

        let mode = self.layout_mode();
        self.emit(
            LAYOUT_READY,
            json!({
                "modeType": mode.mode_type,
                "viewport": mode.viewport,
            }),
        );
        tracing::info!(mode_type = %mode.mode_type, "layout ready");
        true
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Listens to `event_type`, receiving each payload wrapped in a [`LayoutEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ConsumerLimit`](crate::LayoutError::ConsumerLimit)
    /// when the event is already at its consumer limit.
    pub fn subscribe<F>(&self, event_type: &str, listener: F) -> Result<Subscription>
    where
        F: Fn(LayoutEvent) + Send + Sync + 'static,
    {
        let name = event_type.to_string();
        let consumer = self
            .bus
            .consume(event_type, move |data| listener(LayoutEvent::new(name.clone(), data)))?;
        Ok(Subscription { consumer })
    }

    /// Publishes `data` under `event_type`.
    pub fn emit(&self, event_type: &str, data: Value) {
        self.bus.publish(event_type, data);
    }

    // -- active page -------------------------------------------------------

    /// Tracks `page` as the active page and emits `active-page-change` when
    /// the page name differs from the previous one.
    pub fn set_active_page(&self, page: Option<Arc<dyn Page>>) {
        let current = page.as_ref().map(|p| p.page_name().to_string());
        let (previous, replaced) = {
            let mut active = lock(&self.active_page);
            let previous = active.as_ref().map(|p| p.page_name().to_string());
            (previous, std::mem::replace(&mut *active, page))
        };
        // Released outside the lock; a page's Drop may call back in.
        drop(replaced);

        if previous == current {
            return;
        }

        tracing::debug!(previous = ?previous, current = ?current, "active page changed");
        let change = ActivePageChange {
            previous_page: previous,
            current_page: current,
        };
        match serde_json::to_value(change) {
            Ok(data) => self.emit(ACTIVE_PAGE_CHANGE, data),
            Err(error) => tracing::error!(error = %error, "failed to encode active page change"),
        }
    }

    #[must_use]
    pub fn active_page(&self) -> Option<Arc<dyn Page>> {
        lock(&self.active_page).clone()
    }

    /// Listens for active page changes.
    ///
    /// # Errors
    ///
    /// Same as [`subscribe`](Self::subscribe).
    pub fn on_active_page_change<F>(&self, listener: F) -> Result<Subscription>
    where
        F: Fn(ActivePageChange) + Send + Sync + 'static,
    {
        self.subscribe(ACTIVE_PAGE_CHANGE, move |event| {
            if let Some(change) = ActivePageChange::from_event(&event) {
                listener(change);
            }
        })
    }

    // -- failure -----------------------------------------------------------

    /// Replaces the severity predicate used by [`fail`](Self::fail).
    pub fn set_severity_classifier<F>(&self, classifier: F)
    where
        F: Fn(&str) -> Option<Severity> + Send + Sync + 'static,
    {
        let classifier: SeverityClassifier = Arc::new(classifier);
        *lock(&self.severity) = classifier;
    }

    /// Puts the layout into degraded mode.
    ///
    /// The failure is shown through the messages tray when one is registered;
    /// otherwise, or when the tray panics, the surface is replaced by the
    /// static error panel. Emits `layout-failed` and returns the severity used.
    pub fn fail(&self, error: &(dyn Error + 'static)) -> Severity {
        self.failed.store(true, Ordering::SeqCst);

        let message = error.to_string();
        let classifier = lock(&self.severity).clone();
        let severity = std::panic::catch_unwind(AssertUnwindSafe(|| classifier(&message)))
            .ok()
            .flatten()
            .unwrap_or(Severity::Critical);
        let details = error_details(error);

        tracing::error!(severity = severity.as_str(), error = %details, "layout failed");

        let panel = ErrorPanel::for_failure(severity, Some(details));
        let notified = match self.messages() {
            Some(tray) => {
                let shown = std::panic::catch_unwind(AssertUnwindSafe(|| match severity {
                    Severity::Critical => tray.show_error(&panel.title, Some(&message), MessageOptions::persistent()),
                    Severity::Warning => tray.show_warning(&panel.title, Some(&message), MessageOptions::default()),
                }))
                .is_ok();
                if !shown {
                    tracing::warn!("messages tray panicked, replacing surface");
                }
                shown
            }
            None => false,
        };

        if !notified {
            apply_actions(self.surface.as_ref(), &[Action::ReplaceContents(panel)]);
        }

        self.emit(
            LAYOUT_FAILED,
            json!({
                "severity": severity,
                "message": message,
            }),
        );
        severity
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    // -- teardown ----------------------------------------------------------

    /// Tears the coordinator down: stops the observer, unregisters every bus
    /// consumer, clears the registry and the active page.
    ///
    /// Regions are released, not destroyed. Safe to call repeatedly and
    /// before `init`.
    pub fn destroy(&self) {
        if let Some(task) = lock(&self.observer).take() {
            task.abort();
        }
        let consumers = self.bus.remove_all_consumers(None);
        let regions = lock(&self.registry).take();
        let page = lock(&self.active_page).take();
        drop(regions);
        drop(page);

        tracing::debug!(consumers, "layout coordinator destroyed");
    }
}

impl Drop for LayoutCoordinator {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.observer).take() {
            task.abort();
        }
    }
}

impl fmt::Debug for LayoutCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCoordinator")
            .field("mode", &self.mode_type())
            .field("viewport", &self.viewport())
            .field("registered", &lock(&self.registry).registered_slots())
            .field("ready", &self.is_ready())
            .field("failed", &self.is_failed())
            .finish_non_exhaustive()
    }
}
