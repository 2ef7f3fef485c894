mod common;

use common::{fixture, fixture_with, settle, Recorder};
use layout_core::app::{ManualViewport, ModeChange, ModeType, ObserverMode};
use layout_core::bus::LAYOUT_MODE_CHANGE;
use layout_core::ui::InMemorySurface;
use layout_core::{initialize, Config};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn resize_bursts_are_debounced_on_the_trailing_edge() {
    let fx = fixture(1280);
    let recorder = Recorder::default();
    fx.coordinator.subscribe(LAYOUT_MODE_CHANGE, recorder.listener()).unwrap();
    assert_eq!(fx.coordinator.init(), ObserverMode::Watching);

    fx.viewport.resize(900, 800);
    tokio::time::sleep(Duration::from_millis(30)).await;
    fx.viewport.resize(500, 800);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fx.coordinator.is_layout_desktop(), "still inside the quiet period");

    tokio::time::sleep(Duration::from_millis(100)).await;
    settle().await;
    assert!(fx.coordinator.is_layout_mobile());

    let events = recorder.events();
    assert_eq!(events.len(), 1, "intermediate tablet width never applied");
    let change = ModeChange::from_event(&events[0]).unwrap();
    assert_eq!(change.previous_mode_type, ModeType::Desktop);
    assert_eq!(change.mode_type, ModeType::Mobile);

    fx.coordinator.destroy();
}

#[tokio::test(start_paused = true)]
async fn unavailable_watch_falls_back_to_polling() {
    let config = Config {
        poll_interval_ms: 500,
        ..Config::default()
    };
    let fx = fixture_with(config, ManualViewport::unwatchable(1280, 800));
    assert_eq!(fx.coordinator.init(), ObserverMode::Polling);
    assert_eq!(fx.coordinator.observer_mode(), Some(ObserverMode::Polling));

    fx.viewport.resize(800, 800);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(fx.coordinator.mode_type(), ModeType::Desktop);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fx.coordinator.mode_type(), ModeType::Tablet);

    fx.coordinator.destroy();
}

#[tokio::test(start_paused = true)]
async fn initialize_bootstraps_an_observed_coordinator() {
    let viewport = Arc::new(ManualViewport::new(700, 900));
    let coordinator = initialize(Config::default(), Arc::new(InMemorySurface::new()), viewport.clone()).unwrap();

    assert_eq!(coordinator.mode_type(), ModeType::Mobile);
    assert_eq!(coordinator.observer_mode(), Some(ObserverMode::Watching));

    viewport.resize(1600, 900);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(coordinator.mode_type(), ModeType::Desktop);

    coordinator.destroy();
}

#[test]
fn initialize_rejects_invalid_configuration() {
    let mut config = Config::default();
    config.breakpoints.mobile = 2000;

    let result = initialize(
        config,
        Arc::new(InMemorySurface::new()),
        Arc::new(ManualViewport::new(800, 600)),
    );
    assert!(matches!(result, Err(layout_core::LayoutError::Config(_))));
}

#[test]
fn init_outside_a_runtime_is_detached() {
    let fx = fixture(1280);
    assert_eq!(fx.coordinator.init(), ObserverMode::Detached);
    fx.viewport.resize(400, 800);
    assert!(fx.coordinator.refresh_viewport().is_some());
}
