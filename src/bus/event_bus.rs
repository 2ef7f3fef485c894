//! Multi-pattern event bus.
//!
//! The bus keeps an ordered list of consumers per event name and offers three
//! delivery primitives over it:
//!
//! | Primitive   | Receivers              | Caller sees                       |
//! |-------------|------------------------|-----------------------------------|
//! | `publish`   | every active consumer  | nothing                           |
//! | `send`      | first active consumer  | nothing                           |
//! | `request`   | first active consumer  | the reply, or a [`RequestError`]  |
//!
//! Every delivery runs in its own task spawned on the current Tokio runtime,
//! so a publisher never observes a consumer's side effects on its own call
//! stack. Deliveries of one `publish` are spawned in registration order, but a
//! consumer must not assume a sibling finished before it runs.
//!
//! # Example
//!
//! ```
//! use layout_core::bus::{EventBus, Reply};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::default();
//! let consumer = bus
//!     .consume("ping", |data| Reply::from(json!({ "pong": data })))
//!     .expect("no consumer limit configured");
//!
//! let reply = bus.request("ping", json!(1), None).await.unwrap();
//! assert_eq!(reply, json!({ "pong": 1 }));
//!
//! consumer.unregister();
//! assert!(!bus.has_consumers("ping"));
//! # }
//! ```

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::consumer::{Consumer, ConsumerEntry, ConsumerResult, HandlerFn, Reply};
use super::messages::TraceContext;
use crate::domain::error::{LayoutError, RequestError, Result};
use crate::infrastructure::sync::lock;

/// Default time a `request` waits for its consumer to settle.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Bus construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Maximum consumers per event; `0` means unlimited.
    pub max_consumers_per_event: usize,
    /// Timeout used by `request` when the caller passes `None`.
    pub request_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_consumers_per_event: 0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Default)]
struct Tables {
    by_event: BTreeMap<String, Vec<Arc<ConsumerEntry>>>,
    by_component: BTreeMap<String, Vec<Arc<ConsumerEntry>>>,
}

pub(crate) struct BusInner {
    tables: Mutex<Tables>,
    next_id: AtomicU64,
    config: BusConfig,
}

impl BusInner {
    /// Removes an entry from the dispatch and component tables.
    pub(crate) fn detach(&self, entry: &ConsumerEntry) {
        let mut tables = lock(&self.tables);

        if let Some(list) = tables.by_event.get_mut(&entry.event) {
            list.retain(|e| e.id != entry.id);
            if list.is_empty() {
                tables.by_event.remove(&entry.event);
            }
        }

        if let Some(component) = &entry.component {
            if let Some(list) = tables.by_component.get_mut(component) {
                list.retain(|e| e.id != entry.id);
                if list.is_empty() {
                    tables.by_component.remove(component);
                }
            }
        }
    }

    fn active_consumers(&self, event: &str) -> Vec<Arc<ConsumerEntry>> {
        lock(&self.tables)
            .by_event
            .get(event)
            .map(|list| list.iter().filter(|e| e.is_active()).cloned().collect())
            .unwrap_or_default()
    }

    fn first_active(&self, event: &str) -> Option<Arc<ConsumerEntry>> {
        lock(&self.tables)
            .by_event
            .get(event)
            .and_then(|list| list.iter().find(|e| e.is_active()).cloned())
    }
}

/// Event bus with broadcast, single-consumer, and request/response delivery.
///
/// Cloning is cheap and yields a handle to the same consumer tables.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl EventBus {
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                tables: Mutex::new(Tables::default()),
                next_id: AtomicU64::new(1),
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> BusConfig {
        self.inner.config
    }

    /// Registers a handler for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ConsumerLimit`] when the event already holds the
    /// configured maximum number of consumers.
    pub fn consume<F, R>(&self, event: &str, handler: F) -> Result<Consumer>
    where
        F: Fn(Value) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        self.register(None, event, Arc::new(move |data: Value| -> Reply { handler(data).into() }))
    }

    /// Registers a handler tagged with a component name.
    ///
    /// Tagged consumers can be removed together with
    /// [`unregister_component`](Self::unregister_component).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ConsumerLimit`] when the event is full.
    pub fn consume_for<F, R>(&self, component: &str, event: &str, handler: F) -> Result<Consumer>
    where
        F: Fn(Value) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        self.register(
            Some(component.to_string()),
            event,
            Arc::new(move |data: Value| -> Reply { handler(data).into() }),
        )
    }

    fn register(&self, component: Option<String>, event: &str, handler: HandlerFn) -> Result<Consumer> {
        let limit = self.inner.config.max_consumers_per_event;
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let entry = Arc::new(ConsumerEntry::new(id, event.to_string(), component, handler));

        {
            let mut tables = lock(&self.inner.tables);
            let list = tables.by_event.entry(event.to_string()).or_default();
            if limit > 0 && list.len() >= limit {
                tracing::warn!(event, limit, "consumer limit reached");
                return Err(LayoutError::ConsumerLimit {
                    event: event.to_string(),
                    limit,
                });
            }
            list.push(Arc::clone(&entry));

            if let Some(component) = &entry.component {
                tables
                    .by_component
                    .entry(component.clone())
                    .or_default()
                    .push(Arc::clone(&entry));
            }
        }

        tracing::debug!(event, consumer_id = id, component = ?entry.component, "consumer registered");
        Ok(Consumer::new(entry, Arc::downgrade(&self.inner)))
    }

    /// Delivers `data` to every consumer active at the time of the call.
    ///
    /// Each delivery is spawned on the current runtime. Consumer failures are
    /// logged and never reach the publisher. Publishing to an event without
    /// consumers is a no-op.
    pub fn publish(&self, event: &str, data: Value) {
        let targets = self.inner.active_consumers(event);
        if targets.is_empty() {
            tracing::trace!(event, "publish without consumers");
            return;
        }

        tracing::debug!(event, consumers = targets.len(), "publishing event");
        let trace = TraceContext::from_current();
        for entry in targets {
            schedule(entry, data.clone(), trace.clone());
        }
    }

    /// Delivers `data` to the first active consumer by registration order.
    ///
    /// Silent no-op when the event has no active consumer.
    pub fn send(&self, event: &str, data: Value) {
        let Some(entry) = self.inner.first_active(event) else {
            tracing::trace!(event, "send without consumers");
            return;
        };

        tracing::debug!(event, consumer_id = entry.id, "sending event");
        schedule(entry, data, TraceContext::from_current());
    }

    /// Delivers `data` to the first active consumer and awaits its reply.
    ///
    /// `timeout` defaults to the bus's configured request timeout. The timer
    /// is dropped as soon as the consumer settles.
    ///
    /// # Errors
    ///
    /// - [`RequestError::NoConsumer`] immediately when no active consumer exists
    /// - [`RequestError::ConsumerError`] when the consumer fails or panics
    /// - [`RequestError::Timeout`] when the consumer does not settle in time
    pub async fn request(
        &self,
        event: &str,
        data: Value,
        timeout: Option<Duration>,
    ) -> std::result::Result<Value, RequestError> {
        let Some(entry) = self.inner.first_active(event) else {
            tracing::debug!(event, "request without consumers");
            return Err(RequestError::NoConsumer {
                event: event.to_string(),
            });
        };

        let timeout = timeout.unwrap_or(self.inner.config.request_timeout);
        let trace = TraceContext::from_current();
        let (reply_tx, reply_rx) = oneshot::channel::<Option<ConsumerResult>>();

        tokio::spawn(async move {
            let outcome = deliver(&entry, data, trace.as_ref()).await;
            let _ = reply_tx.send(outcome);
        });

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(Some(Ok(value)))) => Ok(value),
            Ok(Ok(Some(Err(message)))) => Err(RequestError::ConsumerError {
                event: event.to_string(),
                message,
            }),
            Ok(Ok(None)) => Err(RequestError::NoConsumer {
                event: event.to_string(),
            }),
            Ok(Err(_)) => Err(RequestError::ConsumerError {
                event: event.to_string(),
                message: "delivery task dropped before replying".to_string(),
            }),
            Err(_) => {
                tracing::warn!(event, timeout_ms = timeout.as_millis() as u64, "request timed out");
                Err(RequestError::Timeout {
                    event: event.to_string(),
                    timeout,
                })
            }
        }
    }

    #[must_use]
    pub fn has_consumers(&self, event: &str) -> bool {
        self.consumer_count(event) > 0
    }

    /// Number of active consumers registered for `event`.
    #[must_use]
    pub fn consumer_count(&self, event: &str) -> usize {
        lock(&self.inner.tables)
            .by_event
            .get(event)
            .map_or(0, |list| list.iter().filter(|e| e.is_active()).count())
    }

    /// Event names with at least one registered consumer, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        lock(&self.inner.tables).by_event.keys().cloned().collect()
    }

    /// Unregisters every consumer of `event`, or of every event when `None`.
    ///
    /// Returns the number of consumers removed.
    pub fn remove_all_consumers(&self, event: Option<&str>) -> usize {
        let removed: Vec<Arc<ConsumerEntry>> = {
            let tables = lock(&self.inner.tables);
            match event {
                Some(name) => tables.by_event.get(name).cloned().unwrap_or_default(),
                None => tables.by_event.values().flatten().cloned().collect(),
            }
        };

        for entry in &removed {
            entry.deactivate();
            self.inner.detach(entry);
        }

        tracing::debug!(event = ?event, removed = removed.len(), "consumers removed");
        removed.len()
    }

    /// Unregisters every consumer registered with `component` as its tag.
    ///
    /// Returns the number of consumers removed.
    pub fn unregister_component(&self, component: &str) -> usize {
        let removed = lock(&self.inner.tables)
            .by_component
            .get(component)
            .cloned()
            .unwrap_or_default();

        for entry in &removed {
            entry.deactivate();
            self.inner.detach(entry);
        }

        tracing::debug!(component, removed = removed.len(), "component consumers removed");
        removed.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.event_names())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Spawns a fire-and-forget delivery on the current runtime.
fn schedule(entry: Arc<ConsumerEntry>, data: Value, trace: Option<TraceContext>) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::error!(event = %entry.event, "no async runtime available, delivery dropped");
        return;
    };

    runtime.spawn(async move {
        if let Some(Err(message)) = deliver(&entry, data, trace.as_ref()).await {
            tracing::warn!(
                event = %entry.event,
                consumer_id = entry.id,
                error = %message,
                "consumer failed"
            );
        }
    });
}

/// Runs one delivery. Returns `None` when the consumer went inactive before
/// its turn came.
async fn deliver(entry: &ConsumerEntry, data: Value, trace: Option<&TraceContext>) -> Option<ConsumerResult> {
    if !entry.is_active() {
        tracing::debug!(event = %entry.event, consumer_id = entry.id, "skipping inactive consumer");
        return None;
    }

    let span = tracing::debug_span!(
        "bus_delivery",
        event = %entry.event,
        consumer_id = entry.id,
        parent_trace_id = ?trace.map(|t| t.trace_id.as_str()),
    );
    if let Some(parent) = trace.and_then(TraceContext::to_otel_context) {
        span.set_parent(parent);
    }

    Some(entry.run(data).instrument(span).await)
}
