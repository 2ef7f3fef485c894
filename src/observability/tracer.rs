//! OpenTelemetry tracer provider backed by the rotating trace file.

use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use super::file_writer::{FileWriter, RotationPolicy};
use super::span_formatter::SpanFormatter;

/// Span exporter that appends one OTLP JSON document per batch to a file.
struct FileSpanExporter {
    writer: FileWriter,
    formatter: SpanFormatter,
    shut_down: AtomicBool,
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.shut_down.load(Ordering::SeqCst) {
            Err(TraceError::from("trace file exporter is shut down"))
        } else {
            let document = self.formatter.format_batch(&batch).to_string();
            self.writer
                .write_line(&document)
                .map_err(|e| TraceError::from(e.to_string()))
        };

        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.formatter.set_resource(resource.clone());
    }
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("writer", &self.writer)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

/// Builds a tracer provider that exports every finished span to `path`.
///
/// Spans are exported immediately (simple processor) so a crash loses at most
/// the span that was in progress.
pub fn create_tracer_provider(path: PathBuf, resource: Resource, scope: &str) -> TracerProvider {
    let exporter = FileSpanExporter {
        writer: FileWriter::new(path, RotationPolicy::default()),
        formatter: SpanFormatter::new(resource.clone(), scope),
        shut_down: AtomicBool::new(false),
    };

    tracing::debug!(path = %exporter.writer.path().display(), "span export enabled");

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
