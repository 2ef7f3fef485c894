//! Tracing setup with optional OTLP file export.
//!
//! Every layer of the crate logs through `tracing`. This module installs the
//! subscriber: human-readable output on stderr and, when a trace file is
//! configured, OpenTelemetry spans written as OTLP JSON lines.
//!
//! ```text
//! tracing → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSON lines
//! ```
//!
//! # Configuration
//!
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` in [`Config`](crate::Config)
//! 3. Default: `"info"`
//!
//! `trace_file` enables the OTLP export; the file rotates at 10 MB and keeps
//! three backups.
//!
//! # Usage
//!
//! ```no_run
//! use layout_core::observability::init_tracing;
//! use layout_core::Config;
//!
//! init_tracing(&Config::default());
//! tracing::debug!("tracing is active");
//! ```

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;
