#![allow(dead_code)]

use layout_core::app::{LayoutCoordinator, ManualViewport};
use layout_core::ui::InMemorySurface;
use layout_core::{Config, LayoutEvent, MessageOptions, MessagesTray, Page, Region};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Lets every spawned delivery run. With a paused clock the runtime only
/// advances time once all tasks are idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub struct Fixture {
    pub coordinator: Arc<LayoutCoordinator>,
    pub surface: Arc<InMemorySurface>,
    pub viewport: Arc<ManualViewport>,
}

pub fn fixture(width: u32) -> Fixture {
    fixture_with(Config::default(), ManualViewport::new(width, 800))
}

pub fn fixture_with(config: Config, viewport: ManualViewport) -> Fixture {
    let surface = Arc::new(InMemorySurface::new());
    let viewport = Arc::new(viewport);
    let coordinator = LayoutCoordinator::new(config, surface.clone(), viewport.clone()).unwrap();
    Fixture {
        coordinator,
        surface,
        viewport,
    }
}

/// Collects the events a subscription receives.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<LayoutEvent>>>,
}

impl Recorder {
    pub fn listener(&self) -> impl Fn(LayoutEvent) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |event| events.lock().unwrap().push(event)
    }

    pub fn events(&self) -> Vec<LayoutEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

pub struct TestRegion(pub &'static str);

impl Region for TestRegion {
    fn region_name(&self) -> &str {
        self.0
    }
}

pub struct TestPage(pub &'static str);

impl Page for TestPage {
    fn page_name(&self) -> &str {
        self.0
    }
}

/// Messages tray that records what it was asked to show.
#[derive(Default)]
pub struct RecordingTray {
    pub shown: Mutex<Vec<(String, String, Option<String>)>>,
    pub panic_on_show: bool,
}

impl RecordingTray {
    fn record(&self, kind: &str, title: &str, description: Option<&str>) {
        if self.panic_on_show {
            panic!("tray is broken");
        }
        self.shown
            .lock()
            .unwrap()
            .push((kind.to_string(), title.to_string(), description.map(str::to_string)));
    }

    pub fn shown(&self) -> Vec<(String, String, Option<String>)> {
        self.shown.lock().unwrap().clone()
    }
}

impl Region for RecordingTray {
    fn region_name(&self) -> &str {
        "messages"
    }
}

impl MessagesTray for RecordingTray {
    fn show_error(&self, title: &str, description: Option<&str>, _options: MessageOptions) {
        self.record("error", title, description);
    }

    fn show_warning(&self, title: &str, description: Option<&str>, _options: MessageOptions) {
        self.record("warning", title, description);
    }

    fn show_info(&self, title: &str, description: Option<&str>, _options: MessageOptions) {
        self.record("info", title, description);
    }

    fn show_success(&self, title: &str, description: Option<&str>, _options: MessageOptions) {
        self.record("success", title, description);
    }
}

/// In-memory log sink for `tracing_subscriber::fmt().with_writer(..)`.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

