//! Call stack tracing
//!
//! [`Tracer::trace`] records the calling thread's stack and prints the frames
//! entered since the previous call on that thread, indented by depth. Frames
//! discovered by this call are marked with `+`; frames printed again (on a
//! thread switch, when configured) are not.
//!
//! Every call runs under a single lock, so the capture, diff and print steps
//! of concurrent calls never interleave.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::capture::{BacktraceCapture, FrameCapture};
use crate::config::TracerConfig;
use crate::frame::FrameInfo;
use crate::identity::{ThreadIdentity, ThreadLocalIdentity};
use crate::message::{escape_braces, message_from, TraceArg};
use crate::sink::Sink;
use crate::stack_diff::find_last_common_frame_index;
use crate::thread_state::ThreadState;
use crate::tracker::{Indentation, Resolution, ThreadTracker};

/// Callout for frames discovered by the current call
pub const CALLOUT_NEW: char = '+';

/// Callout for frames recorded by an earlier call
pub const CALLOUT_PREVIOUS: char = ' ';

/// Padding applied to file names before the location column is truncated
const LOCATION_PAD: usize = 200;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f ";

/// State guarded by the tracer lock
#[derive(Debug, Default)]
struct Locked {
    tracker: ThreadTracker,
    indents: Indentation,
}

/// Records and echoes call stacks
pub struct Tracer {
    enabled: AtomicBool,
    config: RwLock<TracerConfig>,
    capture: Box<dyn FrameCapture>,
    identity: Box<dyn ThreadIdentity>,
    locked: Mutex<Locked>,
}

impl Tracer {
    /// Creates a disabled tracer that walks the native stack.
    pub fn new(config: TracerConfig) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            config: RwLock::new(config),
            capture: Box::new(BacktraceCapture::new()),
            identity: Box::new(ThreadLocalIdentity),
            locked: Mutex::new(Locked::default()),
        }
    }

    /// Replaces the stack capture strategy.
    pub fn with_capture(mut self, capture: impl FrameCapture + 'static) -> Self {
        self.capture = Box::new(capture);
        self
    }

    /// Replaces the thread identity provider.
    pub fn with_identity(mut self, identity: impl ThreadIdentity + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    /// Turns tracing on or off. Idempotent.
    pub fn enable(&self, on: bool) {
        self.enabled.store(on, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Copy of the current configuration
    pub fn config(&self) -> TracerConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration, effective from the next call.
    pub fn set_config(&self, config: TracerConfig) {
        *self.config.write() = config;
    }

    /// Edits the configuration in place, effective from the next call.
    pub fn update_config(&self, update: impl FnOnce(&mut TracerConfig)) {
        update(&mut self.config.write());
    }

    /// Deep copy of the state of every thread traced so far
    pub fn threads(&self) -> HashMap<u64, ThreadState> {
        self.locked.lock().tracker.snapshot()
    }

    /// Deep copy of the state of thread `id`
    pub fn thread(&self, id: u64) -> Option<ThreadState> {
        self.locked.lock().tracker.get(id).cloned()
    }

    /// Empties the history of every thread.
    pub fn clear_history(&self) {
        self.locked.lock().tracker.clear_history();
    }

    /// Drops everything recorded for thread `id`.
    pub fn forget_thread(&self, id: u64) -> Option<ThreadState> {
        self.locked.lock().tracker.forget(id)
    }

    /// Records the calling thread's stack and prints what changed since its
    /// previous call.
    ///
    /// `skip == 0` makes the caller of this function the top of the stack.
    /// `args` become the message of the top frame: a leading
    /// [`TraceArg::Text`] is a format string for the rest, otherwise all
    /// arguments are printed space separated.
    ///
    /// Two consecutive calls from the same frame and two consecutive calls
    /// from sibling frames print the same way: the top frame is always
    /// reported as new.
    ///
    /// # Panics
    ///
    /// If the identity provider cannot tell which thread is calling.
    #[inline(never)]
    pub fn trace(&self, skip: usize, args: &[TraceArg]) {
        if !self.is_enabled() {
            return;
        }
        let config = self.config();
        if !config.is_active() {
            return;
        }
        let Some(sink) = config.sink.clone() else {
            return;
        };

        let mut guard = self.locked.lock();
        let locked = &mut *guard;

        let id = match self.identity.current_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("aborting trace: {}", e);
                panic!("{}", e);
            }
        };

        let (changed, state) = match locked.tracker.resolve(
            id,
            config.lock_thread,
            config.source_width,
            sink.as_ref(),
        ) {
            Resolution::LockedOut => return,
            Resolution::Tracked { changed, state } => (changed, state),
        };

        let now = (config.clock)();
        let captured: Vec<FrameInfo> = self
            .capture
            .capture(skip, config.capacity)
            .into_iter()
            .map(|location| FrameInfo::new(location, now))
            .collect();
        state.top_message = message_from(args);

        let (stored_idx, new_idx) = find_last_common_frame_index(&state.frames, &captured);
        state.merge_frames(captured, stored_idx, new_idx);

        let mut print_below = new_idx;
        if changed {
            if config.print_history_on_switch {
                for line in &state.history {
                    sink.print_line(line);
                }
            } else if config.print_stack_on_switch {
                print_below = state.frames.len();
            }
        }

        let printer = FramePrinter {
            config: &config,
            sink: sink.as_ref(),
        };
        printer.print_frames_below(state, &mut locked.indents, print_below, new_idx);
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .field("config", &*self.config.read())
            .finish_non_exhaustive()
    }
}

/// Formats frames into lines for one trace call
struct FramePrinter<'a> {
    config: &'a TracerConfig,
    sink: &'a dyn Sink,
}

impl FramePrinter<'_> {
    /// Prints the frames with indices strictly lower than `idx` (higher on
    /// the stack), outermost first, marking as new those strictly lower
    /// than `mark_below`.
    fn print_frames_below(
        &self,
        state: &mut ThreadState,
        indents: &mut Indentation,
        idx: usize,
        mark_below: usize,
    ) {
        let depth = state.frames.len();
        for idx in (0..idx.min(depth)).rev() {
            let frame = &state.frames[idx];
            let message = if idx == 0 { state.top_message.as_str() } else { "" };
            let level = depth - idx - 1;
            let template = self.template(state.id, frame, indents.get(level), message);

            let callout = if idx < mark_below {
                CALLOUT_NEW
            } else {
                CALLOUT_PREVIOUS
            };
            let history_line = crate::message::render(&template, &[CALLOUT_PREVIOUS]);
            state.push_history(history_line, self.config.history_limit);
            self.sink.print_with(&template, &[&callout]);
        }
    }

    /// Line template with a single `{}` placeholder for the callout glyph.
    fn template(&self, thread_id: u64, frame: &FrameInfo, indent: &str, message: &str) -> String {
        let timestamp = if self.config.omit_time {
            String::new()
        } else {
            frame.recorded_at.format(TIMESTAMP_FORMAT).to_string()
        };

        let location = self.location(thread_id, frame);
        let line = format!(
            "{}{}{{}}{} {}() {}",
            escape_braces(&timestamp),
            escape_braces(&location),
            indent,
            escape_braces(frame.function()),
            escape_braces(message),
        );
        line.trim().to_string()
    }

    /// The right-most `source_width - 1` characters of the padded
    /// `file:line  p<pc> t<thread>` column; the callout fills the last one,
    /// so the column is exactly `source_width` characters wide.
    fn location(&self, thread_id: u64, frame: &FrameInfo) -> String {
        let width = self.config.source_width;
        if width == 0 {
            return String::new();
        }
        let full = format!(
            "{:>pad$}:{:<4}  p{} t{:<3}",
            frame.file(),
            frame.line(),
            frame.location.pc,
            thread_id,
            pad = LOCATION_PAD,
        );
        let keep = width - 1;
        let total = full.chars().count();
        full.chars().skip(total.saturating_sub(keep)).collect()
    }
}
