//! Viewport observation: debounced change stream with a polling fallback.
//!
//! The observer task only holds a weak handle to the coordinator, so dropping
//! the last coordinator handle ends the task on its next wake-up.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::coordinator::LayoutCoordinator;
use crate::domain::{LayoutError, Result, ViewportSnapshot};
use crate::infrastructure::sync::lock;

/// Host-side source of viewport dimensions.
pub trait ViewportSource: Send + Sync {
    /// Current viewport dimensions.
    fn current(&self) -> ViewportSnapshot;

    /// Opens a stream of raw resize notifications.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Observer`] when the host cannot push resize
    /// notifications; the coordinator then polls [`current`](Self::current).
    fn watch(&self) -> Result<mpsc::UnboundedReceiver<ViewportSnapshot>>;
}

/// A viewport the host (or a test) resizes by hand.
///
/// # Example
///
/// ```
/// use layout_core::app::{ManualViewport, ViewportSource};
///
/// let viewport = ManualViewport::new(1280, 800);
/// viewport.resize(640, 800);
/// assert_eq!(viewport.current().width, 640);
/// ```
#[derive(Debug)]
pub struct ManualViewport {
    current: Mutex<ViewportSnapshot>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<ViewportSnapshot>>>,
    watchable: bool,
}

impl ManualViewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            current: Mutex::new(ViewportSnapshot::new(width, height)),
            watchers: Mutex::new(Vec::new()),
            watchable: true,
        }
    }

    /// A viewport whose `watch()` always fails, forcing the polling fallback.
    #[must_use]
    pub fn unwatchable(width: u32, height: u32) -> Self {
        Self {
            watchable: false,
            ..Self::new(width, height)
        }
    }

    /// Updates the dimensions and notifies every open watch stream.
    pub fn resize(&self, width: u32, height: u32) {
        let snapshot = ViewportSnapshot::new(width, height);
        *lock(&self.current) = snapshot;
        lock(&self.watchers).retain(|tx| tx.send(snapshot).is_ok());
    }
}

impl ViewportSource for ManualViewport {
    fn current(&self) -> ViewportSnapshot {
        *lock(&self.current)
    }

    fn watch(&self) -> Result<mpsc::UnboundedReceiver<ViewportSnapshot>> {
        if !self.watchable {
            return Err(LayoutError::Observer("resize notifications unavailable".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.watchers).push(tx);
        Ok(rx)
    }
}

/// How the observer ended up tracking the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverMode {
    /// Debounced change stream.
    Watching,
    /// Periodic polling after `watch()` failed.
    Polling,
    /// No runtime was available; only explicit viewport changes apply.
    Detached,
}

/// Starts the observer task for `coordinator`.
pub(crate) fn start(
    coordinator: Weak<LayoutCoordinator>,
    source: Arc<dyn ViewportSource>,
    debounce: Duration,
    poll_interval: Duration,
) -> (ObserverMode, Option<JoinHandle<()>>) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("no async runtime available, viewport observer not started");
        return (ObserverMode::Detached, None);
    };

    match source.watch() {
        Ok(rx) => {
            tracing::debug!(debounce_ms = debounce.as_millis() as u64, "watching viewport");
            let task = runtime.spawn(debounce_loop(coordinator, rx, debounce));
            (ObserverMode::Watching, Some(task))
        }
        Err(error) => {
            tracing::warn!(
                error = %error,
                poll_interval_ms = poll_interval.as_millis() as u64,
                "viewport watch unavailable, falling back to polling"
            );
            let task = runtime.spawn(poll_loop(coordinator, source, poll_interval));
            (ObserverMode::Polling, Some(task))
        }
    }
}

/// Trailing-edge debounce: a snapshot is applied once no newer one arrived
/// for `debounce`. Each arrival restarts the single pending timer.
async fn debounce_loop(
    coordinator: Weak<LayoutCoordinator>,
    mut rx: mpsc::UnboundedReceiver<ViewportSnapshot>,
    debounce: Duration,
) {
    let mut pending: Option<ViewportSnapshot> = None;

    loop {
        let Some(snapshot) = pending else {
            match rx.recv().await {
                Some(snapshot) => {
                    pending = Some(snapshot);
                    continue;
                }
                None => break,
            }
        };

        tokio::select! {
            next = rx.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                    apply(&coordinator, snapshot);
                    break;
                }
            },
            () = tokio::time::sleep(debounce) => {
                pending = None;
                if !apply(&coordinator, snapshot) {
                    break;
                }
            }
        }
    }

    tracing::debug!("viewport watch stream closed");
}

async fn poll_loop(coordinator: Weak<LayoutCoordinator>, source: Arc<dyn ViewportSource>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        interval.tick().await;
        let snapshot = source.current();
        let Some(strong) = coordinator.upgrade() else {
            break;
        };
        if strong.viewport() != snapshot {
            strong.handle_viewport_change(snapshot);
        }
    }
}

/// Returns `false` once the coordinator is gone.
fn apply(coordinator: &Weak<LayoutCoordinator>, snapshot: ViewportSnapshot) -> bool {
    match coordinator.upgrade() {
        Some(coordinator) => {
            coordinator.handle_viewport_change(snapshot);
            true
        }
        None => false,
    }
}
