// Copyright (c) 2022 Throne Contributors

//! Structured trace logging shared across every conveyor component.
//!
//! [`throne_trace!`] is a thin wrapper over [`tracing::trace!`] that bundles
//! a dotted `component.operation` path with a JSON context blob, matching
//! the high-frequency internal trace points used throughout the node
//! (slot rotation, item dequeue, middleware dispatch). Externally
//! meaningful events (timeouts, redirects, desync warnings) should use
//! `tracing::{info, warn, error}` directly instead.

/// Emits a trace-level event carrying a dotted path and an optional JSON
/// context object.
///
/// ```
/// use throne_logging::throne_trace;
/// throne_trace!("conveyor.sorter.on_pulse", { "pulse": 42 });
/// throne_trace!("conveyor.worker.run_loop.select", {});
/// ```
#[macro_export]
macro_rules! throne_trace {
    ($key:expr, { $($json_key:tt : $json_value:expr),* $(,)? }) => {
        tracing::trace!(
            msg = $key,
            context = %serde_json::json!({ $($json_key : $json_value),* }),
        );
    };
    ($key:expr) => {
        tracing::trace!(msg = $key);
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macro_expands_with_and_without_context() {
        throne_trace!("throne_logging.tests.with_context", { "a": 1, "b": "x" });
        throne_trace!("throne_logging.tests.without_context", {});
        throne_trace!("throne_logging.tests.bare");
    }
}
