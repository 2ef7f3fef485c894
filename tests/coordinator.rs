mod common;

use common::{fixture, settle, CapturedLogs, Recorder, RecordingTray, TestPage, TestRegion};
use layout_core::app::{ActivePageChange, ModeChange, ModeType, Registered, Slot};
use layout_core::bus::{ACTIVE_PAGE_CHANGE, LAYOUT_FAILED, LAYOUT_MODE_CHANGE, LAYOUT_READY};
use layout_core::ui::SurfaceNode;
use layout_core::{handle_event, Event, LayoutError, Severity, ViewportSnapshot};
use pretty_assertions::assert_eq;
use serde_json::json;
use layout_core::app::{LayoutCoordinator, ManualViewport};
use layout_core::ui::{ErrorPanel, InMemorySurface, RenderSurface};
use layout_core::{Config, Page, Region};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn resize_within_a_bracket_emits_nothing() {
    let fx = fixture(1280);
    let recorder = Recorder::default();
    fx.coordinator.subscribe(LAYOUT_MODE_CHANGE, recorder.listener()).unwrap();

    assert_eq!(fx.coordinator.handle_viewport_change(ViewportSnapshot::new(1400, 900)), None);
    assert_eq!(fx.coordinator.handle_viewport_change(ViewportSnapshot::new(1025, 700)), None);
    settle().await;

    assert_eq!(recorder.len(), 0);
    assert_eq!(fx.surface.write_count(), 0);
    assert_eq!(fx.coordinator.viewport(), ViewportSnapshot::new(1025, 700));
    assert_eq!(fx.coordinator.layout_mode().viewport.width, 1025);
}

#[tokio::test(start_paused = true)]
async fn crossing_a_breakpoint_emits_exactly_one_event() {
    let fx = fixture(1280);
    let recorder = Recorder::default();
    fx.coordinator.subscribe(LAYOUT_MODE_CHANGE, recorder.listener()).unwrap();

    let change = fx
        .coordinator
        .handle_viewport_change(ViewportSnapshot::new(900, 800))
        .expect("desktop to tablet is a type change");
    assert_eq!(change.previous_mode_type, ModeType::Desktop);
    assert_eq!(change.mode_type, ModeType::Tablet);
    assert!(recorder.events().is_empty(), "listeners run on a later turn");

    settle().await;
    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, LAYOUT_MODE_CHANGE);
    assert_eq!(ModeChange::from_event(&events[0]), Some(change));
    assert_eq!(events[0].data["viewport"], json!({ "width": 900, "height": 800 }));

    assert!(fx.coordinator.is_layout_tablet());
    assert_eq!(fx.surface.style_variable("--sidebar-width").as_deref(), Some("64px"));
    assert_eq!(fx.surface.style_variable("--layout-tablet").as_deref(), Some("1"));
    assert_eq!(fx.surface.classes(SurfaceNode::LayoutRoot), vec!["layout-tablet".to_string()]);
    assert_eq!(fx.surface.classes(SurfaceNode::Body), vec!["layout-tablet".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn init_writes_the_initial_layout_without_an_event() {
    let fx = fixture(500);
    let recorder = Recorder::default();
    fx.coordinator.subscribe(LAYOUT_MODE_CHANGE, recorder.listener()).unwrap();

    fx.coordinator.init();
    fx.coordinator.init();
    settle().await;

    assert_eq!(recorder.len(), 0);
    assert!(fx.coordinator.is_layout_mobile());
    assert_eq!(fx.surface.style_variable("--sidebar-width").as_deref(), Some("0px"));
    assert!(fx.surface.has_class(SurfaceNode::Body, "layout-mobile"));
    fx.coordinator.destroy();
}

#[tokio::test(start_paused = true)]
async fn sidebar_compact_only_changes_desktop() {
    let fx = fixture(1440);

    let change = fx.coordinator.set_sidebar_compact(true).unwrap();
    assert_eq!(change.mode_type, ModeType::DesktopCompact);
    assert!(change.is_compact);
    assert!(fx.coordinator.is_layout_desktop());
    assert!(fx.surface.has_class(SurfaceNode::Body, "layout-compact"));

    assert_eq!(
        handle_event(&fx.coordinator, &Event::Resize { width: 900, height: 800 }).map(|c| c.mode_type),
        Some(ModeType::Tablet)
    );
    assert_eq!(fx.coordinator.set_sidebar_compact(false), None);
    assert_eq!(fx.coordinator.set_sidebar_compact(true), None);

    let back = handle_event(&fx.coordinator, &Event::Resize { width: 1440, height: 800 }).unwrap();
    assert_eq!(back.mode_type, ModeType::DesktopCompact);
    assert_eq!(back.previous_mode_type, ModeType::Tablet);
}

#[test]
fn visibility_change_rereads_the_viewport() {
    let fx = fixture(1280);
    fx.viewport.resize(600, 800);

    assert_eq!(handle_event(&fx.coordinator, &Event::VisibilityChange { visible: false }), None);
    assert!(fx.coordinator.is_layout_desktop());

    let change = handle_event(&fx.coordinator, &Event::VisibilityChange { visible: true }).unwrap();
    assert_eq!(change.mode_type, ModeType::Mobile);
}

#[test]
fn registering_twice_keeps_the_second_instance() {
    let fx = fixture(1280);
    assert!(fx.coordinator.header().is_none());

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        fx.coordinator.register_header(Arc::new(TestRegion("first-header")));
        fx.coordinator.register_header(Arc::new(TestRegion("second-header")));
    });

    let output = logs.contents();
    assert_eq!(output.matches("region already registered, replacing").count(), 1, "{output}");
    assert!(output.contains("first-header") && output.contains("second-header"), "{output}");

    let header = fx.coordinator.header().unwrap();
    assert_eq!(header.region_name(), "second-header");
    assert!(matches!(fx.coordinator.region(Slot::Header), Some(Registered::Region(_))));
}

#[test]
fn readiness_requires_the_mandatory_regions() {
    let fx = fixture(1280);
    let c = &fx.coordinator;

    c.register_header(Arc::new(TestRegion("header")));
    c.register_footer(Arc::new(TestRegion("footer")));
    c.register_main_content(Arc::new(TestRegion("main")));
    c.register_sidebar(Arc::new(TestRegion("sidebar")));
    assert!(!c.are_all_components_registered());

    c.register_messages(Arc::new(RecordingTray::default()));
    assert!(c.are_all_components_registered());
    assert!(c.messages().is_some());
    assert_eq!(c.sidebar().map(|s| s.region_name().to_string()).as_deref(), Some("sidebar"));
}

#[tokio::test(start_paused = true)]
async fn mark_ready_emits_once() {
    let fx = fixture(1280);
    let recorder = Recorder::default();
    fx.coordinator.subscribe(LAYOUT_READY, recorder.listener()).unwrap();

    assert!(fx.coordinator.mark_ready());
    assert!(!fx.coordinator.mark_ready());
    settle().await;

    assert_eq!(recorder.len(), 1);
    assert_eq!(recorder.events()[0].data["modeType"], json!("desktop"));
    assert!(fx.coordinator.is_ready());
}

#[tokio::test(start_paused = true)]
async fn unsubscribe_stops_deliveries() {
    let fx = fixture(1280);
    let recorder = Recorder::default();
    let subscription = fx.coordinator.subscribe("custom", recorder.listener()).unwrap();
    assert_eq!(subscription.event(), "custom");

    fx.coordinator.emit("custom", json!(1));
    settle().await;
    subscription.unsubscribe();
    fx.coordinator.emit("custom", json!(2));
    settle().await;

    assert!(!subscription.is_active());
    assert_eq!(recorder.events().iter().map(|e| e.data.clone()).collect::<Vec<_>>(), vec![json!(1)]);
}

#[tokio::test(start_paused = true)]
async fn region_reference_waits_for_registration() {
    let fx = fixture(1280);
    let reference = fx.coordinator.header_ref();

    let coordinator = Arc::clone(&fx.coordinator);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        coordinator.register_header(Arc::new(TestRegion("late-header")));
    });

    let header = reference.get().await.expect("header registers within the timeout");
    assert_eq!(header.region_name(), "late-header");
    assert!(fx.coordinator.messages_ref().get_cached().is_none());
}

#[tokio::test(start_paused = true)]
async fn active_page_changes_are_published() {
    let fx = fixture(1280);
    let changes: Arc<Mutex<Vec<ActivePageChange>>> = Arc::default();
    let sink = Arc::clone(&changes);
    fx.coordinator
        .on_active_page_change(move |change| sink.lock().unwrap().push(change))
        .unwrap();

    fx.coordinator.set_active_page(Some(Arc::new(TestPage("dashboard"))));
    fx.coordinator.set_active_page(Some(Arc::new(TestPage("dashboard"))));
    fx.coordinator.set_active_page(Some(Arc::new(TestPage("settings"))));
    settle().await;

    assert_eq!(
        *changes.lock().unwrap(),
        vec![
            ActivePageChange {
                previous_page: None,
                current_page: Some("dashboard".to_string()),
            },
            ActivePageChange {
                previous_page: Some("dashboard".to_string()),
                current_page: Some("settings".to_string()),
            },
        ]
    );
    assert_eq!(fx.coordinator.active_page().map(|p| p.page_name().to_string()).as_deref(), Some("settings"));
    assert!(fx.coordinator.bus().has_consumers(ACTIVE_PAGE_CHANGE));
}

#[tokio::test(start_paused = true)]
async fn fail_notifies_the_messages_tray() {
    let fx = fixture(1280);
    let tray = Arc::new(RecordingTray::default());
    fx.coordinator.register_messages(tray.clone());
    let recorder = Recorder::default();
    fx.coordinator.subscribe(LAYOUT_FAILED, recorder.listener()).unwrap();

    let severity = fx.coordinator.fail(&LayoutError::Config("layout root missing".to_string()));
    settle().await;

    assert_eq!(severity, Severity::Critical);
    assert!(fx.coordinator.is_failed());
    assert_eq!(
        tray.shown(),
        vec![(
            "error".to_string(),
            "Application Error".to_string(),
            Some("Configuration error: layout root missing".to_string())
        )]
    );
    assert_eq!(fx.surface.replaced_contents(), None);
    assert_eq!(recorder.events()[0].data["severity"], json!("critical"));
}

#[test]
fn fail_without_tray_replaces_the_surface() {
    let fx = fixture(1280);
    let error = LayoutError::Io(std::io::Error::new(std::io::ErrorKind::Other, "chart data unavailable"));

    assert_eq!(fx.coordinator.fail(&error), Severity::Warning);

    let markup = fx.surface.replaced_contents().expect("error panel rendered");
    assert!(markup.contains("Something went wrong"));
    assert!(markup.contains("data-action=\"reload\""));
    assert!(markup.contains("<details>"));
    assert!(markup.contains("chart data unavailable"));
}

#[test]
fn broken_tray_and_undecided_classifier_fall_back_to_critical_panel() {
    let fx = fixture(1280);
    fx.coordinator.register_messages(Arc::new(RecordingTray {
        panic_on_show: true,
        ..RecordingTray::default()
    }));
    fx.coordinator.set_severity_classifier(|_| None);

    let severity = fx.coordinator.fail(&LayoutError::Observer("minor".to_string()));

    assert_eq!(severity, Severity::Critical);
    let markup = fx.surface.replaced_contents().unwrap();
    assert!(markup.contains("Application Error"));
}

#[tokio::test(start_paused = true)]
async fn destroy_tears_everything_down_and_is_repeatable() {
    let fx = fixture(1280);
    fx.coordinator.destroy();

    fx.coordinator.init();
    fx.coordinator.register_header(Arc::new(TestRegion("header")));
    fx.coordinator.set_active_page(Some(Arc::new(TestPage("home"))));
    let recorder = Recorder::default();
    let subscription = fx.coordinator.subscribe(LAYOUT_MODE_CHANGE, recorder.listener()).unwrap();

    fx.coordinator.destroy();
    fx.coordinator.destroy();

    assert!(fx.coordinator.header().is_none());
    assert!(fx.coordinator.active_page().is_none());
    assert!(!subscription.is_active());
    assert!(fx.coordinator.bus().event_names().is_empty());

    fx.viewport.resize(500, 800);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(fx.coordinator.is_layout_desktop(), "observer stopped");
    assert_eq!(recorder.len(), 0);
}

/// Surface whose first write stalls, holding a transition mid-apply.
struct StallingSurface {
    inner: InMemorySurface,
    stalled: AtomicBool,
}

impl StallingSurface {
    fn stall_once(&self) {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(200));
        }
    }
}

impl RenderSurface for StallingSurface {
    fn set_style_variable(&self, name: &str, value: &str) {
        self.stall_once();
        self.inner.set_style_variable(name, value);
    }

    fn toggle_class(&self, node: SurfaceNode, class: &str, enabled: bool) {
        self.stall_once();
        self.inner.toggle_class(node, class, enabled);
    }

    fn replace_contents(&self, panel: &ErrorPanel) {
        self.inner.replace_contents(panel);
    }
}

#[test]
fn concurrent_transitions_leave_the_surface_on_the_final_mode() {
    let surface = Arc::new(StallingSurface {
        inner: InMemorySurface::new(),
        stalled: AtomicBool::new(false),
    });
    let viewport = Arc::new(ManualViewport::new(1280, 800));
    let coordinator = LayoutCoordinator::new(Config::default(), surface.clone(), viewport).unwrap();

    let to_tablet = {
        let coordinator = Arc::clone(&coordinator);
        thread::spawn(move || coordinator.handle_viewport_change(ViewportSnapshot::new(900, 800)))
    };
    thread::sleep(Duration::from_millis(50));
    let to_mobile = {
        let coordinator = Arc::clone(&coordinator);
        thread::spawn(move || coordinator.handle_viewport_change(ViewportSnapshot::new(500, 800)))
    };

    assert_eq!(to_tablet.join().unwrap().map(|c| c.mode_type), Some(ModeType::Tablet));
    assert_eq!(to_mobile.join().unwrap().map(|c| c.mode_type), Some(ModeType::Mobile));

    assert_eq!(coordinator.mode_type(), ModeType::Mobile);
    assert_eq!(surface.inner.classes(SurfaceNode::Body), vec!["layout-mobile".to_string()]);
    assert_eq!(surface.inner.classes(SurfaceNode::LayoutRoot), vec!["layout-mobile".to_string()]);
    assert_eq!(surface.inner.style_variable("--sidebar-width").as_deref(), Some("0px"));
}

/// Page and region whose `Drop` reads the coordinator back.
struct ReentrantComponent {
    coordinator: Weak<LayoutCoordinator>,
    dropped: Arc<AtomicBool>,
}

impl Region for ReentrantComponent {
    fn region_name(&self) -> &str {
        "reentrant"
    }
}

impl Page for ReentrantComponent {
    fn page_name(&self) -> &str {
        "reentrant"
    }
}

impl Drop for ReentrantComponent {
    fn drop(&mut self) {
        if let Some(coordinator) = self.coordinator.upgrade() {
            let _ = coordinator.active_page();
            let _ = coordinator.header();
        }
        self.dropped.store(true, Ordering::SeqCst);
    }
}

fn within_deadline(work: impl FnOnce() + Send + 'static) {
    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        work();
        let _ = done_tx.send(());
    });
    done_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("coordinator call did not return");
}

#[test]
fn released_components_may_call_back_into_the_coordinator() {
    let fx = fixture(1280);
    let page_dropped = Arc::new(AtomicBool::new(false));
    let header_dropped = Arc::new(AtomicBool::new(false));

    fx.coordinator.set_active_page(Some(Arc::new(ReentrantComponent {
        coordinator: Arc::downgrade(&fx.coordinator),
        dropped: Arc::clone(&page_dropped),
    })));
    let coordinator = Arc::clone(&fx.coordinator);
    within_deadline(move || coordinator.set_active_page(Some(Arc::new(TestPage("next")))));
    assert!(page_dropped.load(Ordering::SeqCst));
    assert_eq!(fx.coordinator.active_page().map(|p| p.page_name().to_string()).as_deref(), Some("next"));

    fx.coordinator.register_header(Arc::new(ReentrantComponent {
        coordinator: Arc::downgrade(&fx.coordinator),
        dropped: Arc::clone(&header_dropped),
    }));
    let coordinator = Arc::clone(&fx.coordinator);
    within_deadline(move || coordinator.destroy());
    assert!(header_dropped.load(Ordering::SeqCst));
    assert!(fx.coordinator.header().is_none());
    assert!(fx.coordinator.active_page().is_none());
}

