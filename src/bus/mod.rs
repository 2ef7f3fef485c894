//! Event bus for decoupled communication between UI regions.
//!
//! Regions initialize independently and in no fixed order, so they talk to
//! each other through named events instead of direct references. The bus
//! offers broadcast (`publish`), single-consumer (`send`) and request/response
//! (`request`) delivery, each deferred to a later scheduler turn.
//!
//! # Modules
//!
//! - `consumer`: Consumer handles, reply types, and handler invocation
//! - `event_bus`: The [`EventBus`] and its consumer tables
//! - `messages`: Well-known event names, envelopes, and trace context

pub mod consumer;
pub mod event_bus;
pub mod messages;

pub use consumer::{Consumer, ConsumerResult, Reply};
pub use event_bus::{BusConfig, EventBus, DEFAULT_REQUEST_TIMEOUT};
pub use messages::{LayoutEvent, TraceContext, ACTIVE_PAGE_CHANGE, LAYOUT_FAILED, LAYOUT_MODE_CHANGE, LAYOUT_READY};
