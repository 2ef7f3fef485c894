//! Consumer handles and handler reply types.
//!
//! A consumer is a registered handler with its own active/inactive lifecycle.
//! The bus owns the consumer entry; callers hold a [`Consumer`] handle that can
//! query and end that lifecycle.

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::event_bus::BusInner;

/// Outcome of a consumer invocation: a JSON reply or a failure description.
pub type ConsumerResult = std::result::Result<Value, String>;

/// What a handler hands back to the bus.
///
/// Broadcast and single-consumer deliveries only look at the reply to log
/// failures. Request/response deliveries forward the settled value to the
/// requester.
///
/// Handlers rarely construct this directly; `()`, [`Value`] and
/// [`ConsumerResult`] all convert into it.
///
/// # Example
///
/// ```
/// use layout_core::bus::Reply;
/// use serde_json::json;
///
/// let ready: Reply = json!({"ok": true}).into();
/// let deferred = Reply::pending(async { Ok(json!(42)) });
/// let failed = Reply::error("not ready");
/// # let _ = (ready, deferred, failed);
/// ```
pub enum Reply {
    /// The handler settled synchronously.
    Ready(ConsumerResult),
    /// The handler settles later.
    Pending(BoxFuture<'static, ConsumerResult>),
}

impl Reply {
    /// Wraps a future that settles the reply asynchronously.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = ConsumerResult> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    /// A reply that reports a consumer failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Ready(Err(message.into()))
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::Ready(Ok(Value::Null))
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Ready(Ok(value))
    }
}

impl From<ConsumerResult> for Reply {
    fn from(result: ConsumerResult) -> Self {
        Self::Ready(result)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

pub(crate) type HandlerFn = Arc<dyn Fn(Value) -> Reply + Send + Sync>;

/// Bus-owned record of a registered handler.
pub(crate) struct ConsumerEntry {
    pub(crate) id: u64,
    pub(crate) event: String,
    pub(crate) component: Option<String>,
    active: AtomicBool,
    handler: HandlerFn,
}

impl ConsumerEntry {
    pub(crate) fn new(id: u64, event: String, component: Option<String>, handler: HandlerFn) -> Self {
        Self {
            id,
            event,
            component,
            active: AtomicBool::new(true),
            handler,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Flips the entry to inactive. Returns `true` only for the call that did it.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }

    /// Runs the handler and settles its reply.
    ///
    /// Panics raised by the handler, synchronously or from its reply future,
    /// are converted into a failed [`ConsumerResult`].
    pub(crate) async fn run(&self, data: Value) -> ConsumerResult {
        let handler = Arc::clone(&self.handler);
        let reply = match std::panic::catch_unwind(AssertUnwindSafe(move || handler(data))) {
            Ok(reply) => reply,
            Err(payload) => return Err(panic_message(payload.as_ref())),
        };

        match reply {
            Reply::Ready(result) => result,
            Reply::Pending(future) => AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(
            || "consumer panicked".to_string(),
            |message| format!("consumer panicked: {message}"),
        )
}

/// Handle to a registered consumer.
///
/// Cloning the handle does not register a second consumer; all clones refer to
/// the same entry. Dropping every handle leaves the consumer registered.
#[derive(Clone)]
pub struct Consumer {
    entry: Arc<ConsumerEntry>,
    bus: Weak<BusInner>,
}

impl Consumer {
    pub(crate) fn new(entry: Arc<ConsumerEntry>, bus: Weak<BusInner>) -> Self {
        Self { entry, bus }
    }

    /// Bus-unique consumer identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.entry.id
    }

    /// Event name this consumer listens to.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.entry.event
    }

    /// Component tag supplied at registration, if any.
    #[must_use]
    pub fn component(&self) -> Option<&str> {
        self.entry.component.as_deref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entry.is_active()
    }

    /// Deactivates the consumer and removes it from the bus tables.
    ///
    /// Idempotent. Deliveries whose scheduled turn has not fired yet are
    /// skipped; a delivery that is already running completes.
    pub fn unregister(&self) {
        if !self.entry.deactivate() {
            return;
        }

        if let Some(bus) = self.bus.upgrade() {
            bus.detach(&self.entry);
        }

        tracing::debug!(event = %self.entry.event, consumer_id = self.entry.id, "consumer unregistered");
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("id", &self.entry.id)
            .field("event", &self.entry.event)
            .field("component", &self.entry.component)
            .field("active", &self.entry.is_active())
            .finish()
    }
}
