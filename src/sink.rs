//! Output sinks for traced lines
//!
//! The tracer never writes anywhere by itself. Every line goes through a
//! [`Sink`], which decides where it ends up.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::message::render;

/// Destination for traced lines
pub trait Sink: Send + Sync {
    /// Writes one line of output.
    fn print_line(&self, line: &str);

    /// Writes one line built from `template`, whose `{}` placeholders are
    /// replaced by `args` in order.
    fn print_with(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.print_line(&render(template, args));
    }
}

/// Writes prefixed lines to any writer (stdout by default)
pub struct WriterSink {
    prefix: String,
    out: Mutex<Box<dyn Write + Send>>,
}

impl WriterSink {
    pub fn new(prefix: impl Into<String>, out: impl Write + Send + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Sink writing `trace> `-prefixed lines to stdout
    pub fn stdout() -> Self {
        Self::new("trace> ", io::stdout())
    }
}

impl Sink for WriterSink {
    fn print_line(&self, line: &str) {
        let mut out = self.out.lock();
        // Output errors are not the traced program's concern.
        if let Err(e) = writeln!(out, "{}{}", self.prefix, line) {
            tracing::debug!("trace sink write failed: {}", e);
        }
    }
}

impl fmt::Debug for WriterSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink").field("prefix", &self.prefix).finish()
    }
}

/// Keeps every line in memory
///
/// Clones share the same buffer, so a test can hand one clone to the tracer
/// and read the output through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Removes and returns all lines written so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl Sink for MemorySink {
    fn print_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Emits each line as an INFO event under the `stackecho` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn print_line(&self, line: &str) {
        tracing::info!(target: "stackecho", "{}", line);
    }
}
