//! Per-thread bookkeeping
//!
//! The [`ThreadTracker`] owns every [`ThreadState`] the tracer knows about
//! and remembers which thread called last. [`Indentation`] caches the
//! strings used to indent printed frames. Both are only ever touched under
//! the tracer's lock.

use std::collections::HashMap;

use crate::sink::Sink;
use crate::thread_state::ThreadState;

/// Outcome of resolving the calling thread
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Another thread holds the tracer; nothing was changed or printed
    LockedOut,
    /// The caller's state, and whether control switched threads
    Tracked {
        changed: bool,
        state: &'a mut ThreadState,
    },
}

/// Maps thread ids to their tracing state
#[derive(Debug, Default)]
pub struct ThreadTracker {
    threads: HashMap<u64, ThreadState>,
    /// Id of the last thread traced, 0 before the first call
    last_id: u64,
    marker: String,
}

impl ThreadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the thread traced most recently, if any
    pub fn last_id(&self) -> Option<u64> {
        (self.last_id != 0).then_some(self.last_id)
    }

    /// Resolves (creating if needed) the state for thread `id`.
    ///
    /// When `id` differs from the previous caller, a switch marker is
    /// printed to `sink` and `changed` is set. With `lock_thread`, calls
    /// from any thread other than the last one traced are refused; a tracer
    /// locked before its first call refuses everyone.
    pub fn resolve(
        &mut self,
        id: u64,
        lock_thread: bool,
        source_width: usize,
        sink: &dyn Sink,
    ) -> Resolution<'_> {
        let mut changed = false;
        if id != self.last_id {
            if lock_thread {
                tracing::debug!(thread = id, locked = self.last_id, "trace call locked out");
                return Resolution::LockedOut;
            }
            if self.marker.len() != source_width {
                self.marker = "-".repeat(source_width);
            }
            sink.print_with(
                "{} thread switched: {} -> {} {}",
                &[&self.marker, &format!("{:>3}", self.last_id), &format!("{:<3}", id), &self.marker],
            );
            tracing::debug!(from = self.last_id, to = id, "thread switched");
            changed = true;
        }
        self.last_id = id;

        let state = self
            .threads
            .entry(id)
            .or_insert_with(|| ThreadState::new(id));
        Resolution::Tracked { changed, state }
    }

    /// Deep copy of every tracked thread
    pub fn snapshot(&self) -> HashMap<u64, ThreadState> {
        self.threads.clone()
    }

    pub fn get(&self, id: u64) -> Option<&ThreadState> {
        self.threads.get(&id)
    }

    /// Drops the state of thread `id`, returning it.
    pub fn forget(&mut self, id: u64) -> Option<ThreadState> {
        self.threads.remove(&id)
    }

    /// Empties the history of every thread, keeping current stacks.
    pub fn clear_history(&mut self) {
        for state in self.threads.values_mut() {
            state.history.clear();
        }
    }
}

/// Cache of indentation strings, two spaces per level
#[derive(Debug, Default)]
pub struct Indentation {
    indents: Vec<String>,
}

impl Indentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indentation for a frame `level` calls deep
    pub fn get(&mut self, level: usize) -> &str {
        while level >= self.indents.len() {
            let next = "  ".repeat(self.indents.len());
            self.indents.push(next);
        }
        &self.indents[level]
    }
}
