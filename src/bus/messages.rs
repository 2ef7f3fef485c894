//! Message types carried by the event bus.
//!
//! This module defines the well-known event names the coordinator publishes,
//! the [`LayoutEvent`] envelope that `subscribe` listeners receive, and the
//! [`TraceContext`] that links a deferred delivery back to the span that
//! published it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Emitted when the layout mode type changes.
pub const LAYOUT_MODE_CHANGE: &str = "layout-mode-change";

/// Emitted exactly once by [`LayoutCoordinator::mark_ready`](crate::app::LayoutCoordinator::mark_ready).
pub const LAYOUT_READY: &str = "layout-ready";

/// Emitted when the tracked active page changes.
pub const ACTIVE_PAGE_CHANGE: &str = "active-page-change";

/// Emitted when the coordinator enters degraded mode.
pub const LAYOUT_FAILED: &str = "layout-failed";

/// Distributed tracing context captured at publish time.
///
/// Bus deliveries run on a later scheduler turn, outside the publisher's span.
/// Capturing the OpenTelemetry trace and span IDs when the event is published
/// lets the delivery span continue the publisher's trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Span ID of the publishing span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the trace context of the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the current
    /// span is not sampled.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();
        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Rebuilds a remote OpenTelemetry parent from the captured IDs.
    ///
    /// Returns `None` if either ID is not valid hex.
    #[must_use]
    pub fn to_otel_context(&self) -> Option<opentelemetry::Context> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;
        let span_context = SpanContext::new(trace_id, span_id, TraceFlags::SAMPLED, true, TraceState::default());

        if !span_context.is_valid() {
            return None;
        }
        Some(opentelemetry::Context::new().with_remote_span_context(span_context))
    }
}

/// Structured envelope delivered to [`LayoutCoordinator::subscribe`](crate::app::LayoutCoordinator::subscribe) listeners.
///
/// The bus itself moves bare JSON payloads; the coordinator wraps them with
/// the event type and the delivery timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEvent {
    /// Event name the payload was published under.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Published payload.
    pub data: Value,

    /// Delivery time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl LayoutEvent {
    /// Wraps a payload, stamping it with the current time.
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TraceContextExt;

    #[test]
    fn otel_context_carries_the_captured_ids() {
        let trace = TraceContext {
            trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".to_string(),
            parent_span_id: "00f067aa0ba902b7".to_string(),
        };

        let context = trace.to_otel_context().unwrap();
        let span = context.span();
        let span_context = span.span_context();
        assert!(span_context.is_remote());
        assert!(span_context.is_sampled());
        assert_eq!(format!("{:032x}", span_context.trace_id()), trace.trace_id);
        assert_eq!(format!("{:016x}", span_context.span_id()), trace.parent_span_id);
    }

    #[test]
    fn malformed_ids_give_no_context() {
        let trace = TraceContext {
            trace_id: "not-hex".to_string(),
            parent_span_id: "00f067aa0ba902b7".to_string(),
        };
        assert!(trace.to_otel_context().is_none());

        let zero = TraceContext {
            trace_id: "0".repeat(32),
            parent_span_id: "0".repeat(16),
        };
        assert!(zero.to_otel_context().is_none());
    }
}
