//! Metric instrument factories for repetask.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("repetask")
}

/// Counter: tasks created.
pub fn tasks_created() -> Counter<u64> {
    meter()
        .u64_counter("repetask.tasks.created")
        .with_description("Number of tasks created")
        .build()
}

/// Counter: completion attempts.
/// Labels: `outcome` ("advanced" | "finished" | "rejected").
pub fn task_completions() -> Counter<u64> {
    meter()
        .u64_counter("repetask.tasks.completions")
        .with_description("Number of task completion attempts")
        .build()
}

/// Counter: notes created.
pub fn notes_created() -> Counter<u64> {
    meter()
        .u64_counter("repetask.notes.created")
        .with_description("Number of notes created")
        .build()
}

/// Counter: rejected credentials.
pub fn auth_failures() -> Counter<u64> {
    meter()
        .u64_counter("repetask.auth.failures")
        .with_description("Number of failed authentication attempts")
        .build()
}

/// Histogram: HTTP request duration in milliseconds.
/// Labels: `method`, `status`.
pub fn http_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("repetask.http.duration_ms")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .build()
}
