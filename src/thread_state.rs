//! Per-thread tracing state

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::frame::FrameInfo;

/// Everything the tracer knows about one thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    /// Numerical id of this thread, as given by the identity provider
    pub id: u64,

    /// The current stack frames, innermost (top of the stack) first
    pub frames: Vec<FrameInfo>,

    /// The message, if any, logged on the last `trace` call from this thread.
    ///
    /// Only the innermost frame can carry a message: every other frame is a
    /// call site rather than a `trace` site, so the message is stored once
    /// per thread instead of per frame.
    pub top_message: String,

    /// Every line printed for this thread, oldest first
    pub history: VecDeque<String>,
}

impl ThreadState {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Innermost frame, if any
    pub fn top(&self) -> Option<&FrameInfo> {
        self.frames.first()
    }

    /// Appends a printed line, dropping the oldest ones beyond `limit`.
    pub fn push_history(&mut self, line: String, limit: Option<usize>) {
        self.history.push_back(line);
        if let Some(limit) = limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Replaces the frame stack with the frames newly captured above
    /// `new_idx`, followed by the previously stored frames from `stored_idx`.
    ///
    /// Keeping the stored tail preserves the capture time of frames that were
    /// already on the stack.
    pub fn merge_frames(&mut self, mut captured: Vec<FrameInfo>, stored_idx: usize, new_idx: usize) {
        captured.truncate(new_idx);
        captured.extend(self.frames.drain(stored_idx..));
        self.frames = captured;
    }
}
