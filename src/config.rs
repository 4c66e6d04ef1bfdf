//! Tracer configuration
//!
//! A [`TracerConfig`] is read once at the start of every `trace` call, so
//! changes made through [`crate::Tracer::update_config`] apply to the next
//! call and never to one already in progress.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Result, TraceError};
use crate::sink::Sink;

/// Largest stack the tracer will capture
pub const MAX_CAPACITY: usize = 4096;

/// Default stack capacity
pub const DEFAULT_CAPACITY: usize = 100;

/// Default width of the `file:line` column
pub const DEFAULT_SOURCE_WIDTH: usize = 40;

/// Clock used to stamp captured frames
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Settings read by the tracer on each call
#[derive(Clone)]
pub struct TracerConfig {
    /// Receives the output; tracing is a no-op without one
    pub sink: Option<Arc<dyn Sink>>,

    /// Maximum number of stack frames captured per call
    pub capacity: usize,

    /// Displayed width, right-justified, of the `file:line` column.
    /// Zero hides the column.
    pub source_width: usize,

    /// Only trace the thread traced last; set before the first call, nothing is traced
    pub lock_thread: bool,

    /// Leave timestamps out of printed lines. Handy when the sink already
    /// stamps its output, at the cost of losing the original capture time of
    /// frames replayed on a thread switch.
    pub omit_time: bool,

    /// Time source for frame capture
    pub clock: Clock,

    /// On a thread switch, print the thread's whole current stack
    pub print_stack_on_switch: bool,

    /// On a thread switch, replay everything printed so far for the thread.
    /// Takes precedence over `print_stack_on_switch`.
    pub print_history_on_switch: bool,

    /// Maximum number of history lines kept per thread, `None` for no bound
    pub history_limit: Option<usize>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            sink: None,
            capacity: DEFAULT_CAPACITY,
            source_width: DEFAULT_SOURCE_WIDTH,
            lock_thread: false,
            omit_time: false,
            clock: Arc::new(Utc::now),
            print_stack_on_switch: false,
            print_history_on_switch: false,
            history_limit: None,
        }
    }
}

impl TracerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn with_shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_source_width(mut self, width: usize) -> Self {
        self.source_width = width;
        self
    }

    pub fn with_lock_thread(mut self, lock: bool) -> Self {
        self.lock_thread = lock;
        self
    }

    pub fn with_omit_time(mut self, omit: bool) -> Self {
        self.omit_time = omit;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_print_stack_on_switch(mut self, print: bool) -> Self {
        self.print_stack_on_switch = print;
        self
    }

    pub fn with_print_history_on_switch(mut self, print: bool) -> Self {
        self.print_history_on_switch = print;
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Whether a trace call with this configuration does anything at all
    pub fn is_active(&self) -> bool {
        self.sink.is_some() && self.capacity > 0
    }

    /// Checks values that are representable but meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.capacity > MAX_CAPACITY {
            return Err(TraceError::InvalidConfig(format!(
                "capacity {} exceeds the maximum of {}",
                self.capacity, MAX_CAPACITY
            )));
        }
        if self.history_limit == Some(0) {
            return Err(TraceError::InvalidConfig(
                "history limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for TracerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracerConfig")
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .field("capacity", &self.capacity)
            .field("source_width", &self.source_width)
            .field("lock_thread", &self.lock_thread)
            .field("omit_time", &self.omit_time)
            .field("print_stack_on_switch", &self.print_stack_on_switch)
            .field("print_history_on_switch", &self.print_history_on_switch)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use chrono::TimeZone;

    #[test]
    fn test_default_config() {
        let config = TracerConfig::default();
        assert!(config.sink.is_none());
        assert_eq!(config.capacity, 100);
        assert_eq!(config.source_width, 40);
        assert!(!config.lock_thread);
        assert!(!config.omit_time);
        assert!(config.history_limit.is_none());
        assert!(!config.is_active());
    }

    #[test]
    fn test_builder_sets_fields() {
        let fixed = Utc.timestamp_opt(1_000, 0).single().unwrap();
        let config = TracerConfig::new()
            .with_sink(MemorySink::new())
            .with_capacity(8)
            .with_source_width(0)
            .with_lock_thread(true)
            .with_omit_time(true)
            .with_clock(move || fixed)
            .with_print_stack_on_switch(true)
            .with_print_history_on_switch(true)
            .with_history_limit(Some(10));

        assert!(config.is_active());
        assert_eq!(config.capacity, 8);
        assert_eq!(config.source_width, 0);
        assert!(config.lock_thread);
        assert!(config.omit_time);
        assert_eq!((config.clock)(), fixed);
        assert!(config.print_stack_on_switch);
        assert!(config.print_history_on_switch);
        assert_eq!(config.history_limit, Some(10));
    }

    #[test]
    fn test_zero_capacity_is_inactive() {
        let config = TracerConfig::new()
            .with_sink(MemorySink::new())
            .with_capacity(0);
        assert!(!config.is_active());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_huge_capacity() {
        let config = TracerConfig::new().with_capacity(MAX_CAPACITY + 1);
        assert!(matches!(config.validate(), Err(TraceError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_history_limit() {
        let config = TracerConfig::new().with_history_limit(Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_sink() {
        let config = TracerConfig::new().with_sink(MemorySink::new());
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("TracerConfig"));
        assert!(debug_str.contains("<sink>"));
    }
}
