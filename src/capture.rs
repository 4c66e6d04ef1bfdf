//! Stack capture
//!
//! The tracer asks a [`FrameCapture`] for the calling thread's stack. The
//! real implementation walks the native stack with the `backtrace` crate;
//! [`SyntheticCapture`] returns stacks set up by hand so the diffing and
//! printing logic can be exercised deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::frame::Location;
use crate::identity::current_thread_id;
use crate::message::TraceArg;
use crate::tracer::Tracer;

/// Upper bound on frames walked past the requested window
const MAX_INTERNAL_FRAMES: usize = 128;

/// Source of call stacks
pub trait FrameCapture: Send + Sync {
    /// Returns up to `capacity` locations of the calling thread's stack,
    /// innermost first.
    ///
    /// `skip == 0` starts with the caller of [`Tracer::trace`]; each
    /// increment skips one more frame.
    fn capture(&self, skip: usize, capacity: usize) -> Vec<Location>;
}

/// Walks the native stack and resolves symbols with the `backtrace` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapture;

impl BacktraceCapture {
    pub fn new() -> Self {
        Self
    }
}

impl FrameCapture for BacktraceCapture {
    #[inline(never)]
    fn capture(&self, skip: usize, capacity: usize) -> Vec<Location> {
        let anchor = Tracer::trace as fn(&Tracer, usize, &[TraceArg]) as usize;
        let walk_limit = capacity
            .saturating_add(skip)
            .saturating_add(MAX_INTERNAL_FRAMES);

        let mut frames = Vec::new();
        let mut above_anchor = None;
        backtrace::trace(|frame| {
            if above_anchor.is_none() && frame.symbol_address() as usize == anchor {
                above_anchor = Some(frames.len() + 1);
            }
            frames.push(frame.clone());
            frames.len() < walk_limit
        });

        // Symbol addresses do not always match function pointers (thunks,
        // incremental linking); fall back to skipping our own frames by name.
        let start = match above_anchor {
            Some(idx) => idx,
            None => frames
                .iter()
                .position(|frame| !is_internal(frame))
                .unwrap_or(frames.len()),
        };

        let mut locations = Vec::with_capacity(capacity);
        for frame in frames.iter().skip(start.saturating_add(skip)) {
            if locations.len() >= capacity {
                break;
            }
            resolve(frame, capacity, &mut locations);
        }
        locations
    }
}

/// Resolves `frame` into one location per (possibly inlined) symbol.
fn resolve(frame: &backtrace::Frame, capacity: usize, out: &mut Vec<Location>) {
    let pc = frame.ip() as usize;
    let before = out.len();
    backtrace::resolve_frame(frame, |symbol| {
        if out.len() >= capacity {
            return;
        }
        out.push(Location {
            file: symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            line: symbol.lineno().unwrap_or(0),
            pc,
            function: function_name(symbol.name().map(|name| format!("{:#}", name)), pc),
        });
    });
    if out.len() == before && out.len() < capacity {
        out.push(Location {
            pc,
            function: function_name(None, pc),
            ..Default::default()
        });
    }
}

/// Demangled symbol name, or the frame's address when it has none.
fn function_name(name: Option<String>, pc: usize) -> String {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => format!("0x{:x}", pc),
    }
}

fn is_internal(frame: &backtrace::Frame) -> bool {
    let mut internal = false;
    backtrace::resolve_frame(frame, |symbol| {
        if let Some(name) = symbol.name() {
            let name = format!("{:#}", name);
            internal |= name.starts_with("backtrace::")
                || name.contains("stackecho::capture::")
                || name.starts_with("stackecho::tracer::Tracer::trace");
        }
    });
    internal
}

/// Hand-built stacks, one per thread
///
/// Each thread sets its own stack with [`SyntheticCapture::set_stack`];
/// captures from that thread return it. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct SyntheticCapture {
    stacks: Arc<Mutex<HashMap<u64, Vec<Location>>>>,
}

impl SyntheticCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the calling thread's stack, innermost first.
    pub fn set_stack(&self, stack: Vec<Location>) {
        self.stacks.lock().insert(current_thread_id(), stack);
    }

    /// Sets the calling thread's stack from function names, innermost first.
    ///
    /// Each frame is named after its function, lives in `<name>.rs`, and
    /// uses its depth from the bottom of the stack as line number.
    pub fn set_names(&self, names: &[&str]) {
        let depth = names.len();
        let stack = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Location::new(format!("{}.rs", name), (depth - idx) as u32, 0, *name))
            .collect();
        self.set_stack(stack);
    }
}

impl FrameCapture for SyntheticCapture {
    fn capture(&self, skip: usize, capacity: usize) -> Vec<Location> {
        self.stacks
            .lock()
            .get(&current_thread_id())
            .map(|stack| stack.iter().skip(skip).take(capacity).cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_frames_show_their_address() {
        assert_eq!(function_name(None, 0x7f00_1234), "0x7f001234");
        assert_eq!(function_name(Some(String::new()), 0x10), "0x10");
        assert_eq!(function_name(Some("main".to_string()), 0x10), "main");
    }

    #[test]
    fn test_synthetic_capture_returns_thread_stack() {
        let capture = SyntheticCapture::new();
        capture.set_names(&["c", "b", "a"]);
        let stack = capture.capture(0, 10);
        let names: Vec<_> = stack.iter().map(|l| l.function.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
        assert_eq!(stack[0].file, "c.rs");
        assert_eq!(stack[0].line, 3);
        assert_eq!(stack[2].line, 1);
    }

    #[test]
    fn test_synthetic_capture_applies_skip_and_capacity() {
        let capture = SyntheticCapture::new();
        capture.set_names(&["d", "c", "b", "a"]);
        let names: Vec<_> = capture
            .capture(1, 2)
            .into_iter()
            .map(|l| l.function)
            .collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_synthetic_capture_is_per_thread() {
        let capture = SyntheticCapture::new();
        capture.set_names(&["main"]);
        let other = capture.clone();
        let seen = std::thread::spawn(move || other.capture(0, 10))
            .join()
            .unwrap();
        assert!(seen.is_empty());
        assert_eq!(capture.capture(0, 10).len(), 1);
    }

    #[inline(never)]
    fn nested_capture() -> Vec<Location> {
        BacktraceCapture::new().capture(0, 64)
    }

    #[test]
    fn test_backtrace_capture_respects_capacity() {
        let stack = BacktraceCapture::new().capture(0, 3);
        assert!(stack.len() <= 3);
    }

    #[test]
    fn test_backtrace_capture_sees_callers() {
        // Without the anchor frame on the stack, capture falls back to
        // skipping its own frames by name.
        let stack = nested_capture();
        assert!(!stack.is_empty());
        assert!(stack
            .iter()
            .all(|loc| !loc.function.starts_with("backtrace::")));
    }
}
