//! Process-wide default tracer
//!
//! Most programs only need one tracer. [`tracer()`] returns a lazily built
//! instance writing `trace> `-prefixed lines to stdout, and the [`trace!`]
//! macro traces through it:
//!
//! ```no_run
//! use stackecho::trace;
//!
//! stackecho::global::on(true);
//! trace!("Label: my var={}", 42);
//! trace!();
//! ```
//!
//! The global tracer starts disabled, so `trace!` calls left in code cost one
//! atomic load until tracing is turned on. Its settings may be changed at any
//! time through [`tracer()`] and affect subsequent calls.
//!
//! [`trace!`]: crate::trace

use std::sync::OnceLock;

use crate::config::TracerConfig;
use crate::sink::WriterSink;
use crate::tracer::Tracer;

static GLOBAL: OnceLock<Tracer> = OnceLock::new();

/// Configuration of the global tracer: the most useful defaults for
/// interactive debugging.
pub fn default_config() -> TracerConfig {
    TracerConfig::new()
        .with_sink(WriterSink::stdout())
        .with_print_history_on_switch(true)
}

/// The global tracer, built on first use
pub fn tracer() -> &'static Tracer {
    GLOBAL.get_or_init(|| Tracer::new(default_config()))
}

/// Turns the global tracer on or off. Idempotent.
pub fn on(on: bool) {
    tracer().enable(on);
}

/// Traces the calling function's stack.
///
/// Arguments follow [`Tracer::trace`]: a leading string literal is a format
/// string for the remaining arguments. Each argument goes through
/// [`IntoTraceArg`](crate::message::IntoTraceArg).
///
/// - `trace!(args...)` uses the global tracer.
/// - `trace!(tracer => args...)` uses an explicit tracer.
#[macro_export]
macro_rules! trace {
    ($tracer:expr => $($arg:expr),* $(,)?) => {
        $tracer.trace(0, &[$($crate::message::IntoTraceArg::into_trace_arg($arg)),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::global::tracer().trace(0, &[$($crate::message::IntoTraceArg::into_trace_arg($arg)),*])
    };
}
