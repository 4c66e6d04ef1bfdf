//! stackecho - print-style call stack tracing
//!
//! Sometimes you need to see the sequence in which functions are called, and
//! stepping through each one in a debugger is not the answer. Instead of
//! sprinkling `println!` calls, insert `trace!()` where you want output: each
//! call prints every stack frame entered since the previous call on the same
//! thread, indented by depth and stamped with the time it was recorded.
//!
//! Tracing is concurrency-safe. When a call comes from a different thread
//! than the previous one, a switch marker is printed and, optionally, the
//! thread's current stack or its whole history is replayed.

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod global;
pub mod identity;
pub mod message;
pub mod sink;
pub mod stack_diff;
pub mod thread_state;
pub mod tracer;
pub mod tracker;

pub use capture::{BacktraceCapture, FrameCapture, SyntheticCapture};
pub use config::TracerConfig;
pub use error::{truncate_error, TraceError};
pub use frame::{FrameInfo, Location};
pub use identity::{current_thread_id, ThreadIdentity, ThreadLocalIdentity};
pub use message::{IntoTraceArg, TraceArg};
pub use sink::{MemorySink, Sink, TracingSink, WriterSink};
pub use thread_state::ThreadState;
pub use tracer::Tracer;
