//! Recorded stack frames
//!
//! A [`FrameInfo`] is one entry of a thread's call stack together with the
//! time at which it was captured. Frames higher up the stack that were
//! discovered by the same `trace` call share its timestamp, even though the
//! functions were entered at different times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a frame is in the program: source position, address and function
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file, empty when debug info is unavailable
    pub file: String,
    /// Source line, 0 when unknown
    pub line: u32,
    /// Instruction pointer of the frame
    pub pc: usize,
    /// Demangled function name without the symbol hash
    pub function: String,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, pc: usize, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            pc,
            function: function.into(),
        }
    }
}

/// A stack frame stamped with its capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub location: Location,
    /// When this frame was recorded by `trace`
    pub recorded_at: DateTime<Utc>,
}

impl FrameInfo {
    pub fn new(location: Location, recorded_at: DateTime<Utc>) -> Self {
        Self {
            location,
            recorded_at,
        }
    }

    /// Returns true if both frames refer to the same stack location,
    /// regardless of when they were recorded.
    pub fn same(&self, other: &FrameInfo) -> bool {
        self.location == other.location
    }

    /// Returns true if both frames are identical, timestamp included.
    pub fn equal(&self, other: &FrameInfo) -> bool {
        self == other
    }

    pub fn file(&self) -> &str {
        &self.location.file
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    pub fn function(&self) -> &str {
        &self.location.function
    }
}
