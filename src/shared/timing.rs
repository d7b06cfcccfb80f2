//! Scoped timing for import operations
//!
//! Wraps a call, measures elapsed wall time, and emits one log line
//! with the duration before handing the result back.

use std::time::Instant;

/// Run `operation`, then log `label` with the elapsed milliseconds
pub fn timed<T>(label: &str, operation: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = operation();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    tracing::info!(operation = label, elapsed_ms, "{} finished in {} ms", label, elapsed_ms);
    result
}
