//! Error types for the layout coordination core.
//!
//! This module defines [`LayoutError`], the error type for fallible setup and
//! registration operations, and [`RequestError`], the tagged failure returned by
//! the event bus request/response primitive. Both are implemented with
//! `thiserror`.
//!
//! Most of the crate prefers absorbing failures locally and logging them. The
//! types here cover the few places where a caller must be told: configuration
//! loading, consumer limits, observer setup, and `request()`.

use std::time::Duration;
use thiserror::Error;

/// The main error type for layout core operations.
///
/// # Examples
///
/// ```
/// use layout_core::LayoutError;
///
/// fn validate(mobile: u32, tablet: u32) -> Result<(), LayoutError> {
///     if mobile >= tablet {
///         return Err(LayoutError::Config("mobile breakpoint must be below tablet".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate(1024, 768).is_err());
/// ```
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Configuration is invalid or missing.
    ///
    /// The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A TOML configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An event already holds the configured maximum number of consumers.
    #[error("Consumer limit reached for event '{event}' (max {limit})")]
    ConsumerLimit {
        /// Event name that rejected the registration.
        event: String,
        /// Configured per-event limit.
        limit: usize,
    },

    /// The viewport observation channel could not be established.
    ///
    /// The coordinator reacts to this by falling back to periodic polling, so
    /// callers only see it from [`ViewportSource::watch`](crate::app::ViewportSource::watch).
    #[error("Viewport observer error: {0}")]
    Observer(String),
}

/// A specialized `Result` type for layout core operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Tagged failure of [`EventBus::request`](crate::bus::EventBus::request).
///
/// Each variant carries a stable machine-readable code via [`RequestError::code`]
/// so hosts can branch on the failure kind without matching on message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No active consumer was registered for the event.
    #[error("no consumer registered for event '{event}'")]
    NoConsumer {
        /// Requested event name.
        event: String,
    },

    /// The consumer returned an error, its reply future failed, or it panicked.
    #[error("consumer for event '{event}' failed: {message}")]
    ConsumerError {
        /// Requested event name.
        event: String,
        /// Failure description reported by the consumer.
        message: String,
    },

    /// The consumer did not settle within the request timeout.
    #[error("request for event '{event}' timed out after {}ms", timeout.as_millis())]
    Timeout {
        /// Requested event name.
        event: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

impl RequestError {
    /// Returns the stable code for this failure kind.
    ///
    /// ```
    /// use layout_core::RequestError;
    ///
    /// let err = RequestError::NoConsumer { event: "ping".to_string() };
    /// assert_eq!(err.code(), "NO_CONSUMER");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoConsumer { .. } => "NO_CONSUMER",
            Self::ConsumerError { .. } => "CONSUMER_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Returns the event name the failed request targeted.
    #[must_use]
    pub fn event(&self) -> &str {
        match self {
            Self::NoConsumer { event }
            | Self::ConsumerError { event, .. }
            | Self::Timeout { event, .. } => event,
        }
    }
}

/// User-facing severity of a coordinator-level failure.
///
/// Decides the copy and treatment used by
/// [`LayoutCoordinator::fail`](crate::app::LayoutCoordinator::fail): critical
/// failures block the user, warnings leave the application usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
        }
    }
}
