//! CLI argument parsing for the stackecho demo

use clap::{Parser, ValueEnum};

use crate::config::TracerConfig;

/// What to print when control switches to another thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchPrint {
    /// Only the switch marker
    None,
    /// The thread's whole current stack
    Stack,
    /// Everything printed so far for the thread (default)
    History,
}

#[derive(Parser, Debug)]
#[command(name = "stackecho")]
#[command(version)]
#[command(about = "Trace a nested-call demo workload and echo its call stacks", long_about = None)]
pub struct Cli {
    /// Number of nested rounds each worker performs
    #[arg(short = 'd', long = "depth", value_name = "N", default_value = "2")]
    pub depth: usize,

    /// Number of worker threads running alongside the main thread
    #[arg(short = 't', long = "threads", value_name = "N", default_value = "0")]
    pub threads: usize,

    /// Maximum number of stack frames captured per trace call
    #[arg(long = "capacity", value_name = "N", default_value = "100")]
    pub capacity: usize,

    /// Width of the file:line column (0 hides it)
    #[arg(long = "source-width", value_name = "N", default_value = "40")]
    pub source_width: usize,

    /// Leave timestamps out of traced lines
    #[arg(long = "omit-time")]
    pub omit_time: bool,

    /// Only trace the main thread once it has traced its first line
    #[arg(long = "lock-thread")]
    pub lock_thread: bool,

    /// What to replay on a thread switch
    #[arg(long = "switch-print", value_enum, default_value = "history")]
    pub switch_print: SwitchPrint,

    /// Keep at most N history lines per thread
    #[arg(long = "history-limit", value_name = "N")]
    pub history_limit: Option<usize>,

    /// Print the final per-thread snapshot as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Enable debug tracing output on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Tracer settings selected on the command line, without a sink
    pub fn tracer_config(&self) -> TracerConfig {
        TracerConfig::new()
            .with_capacity(self.capacity)
            .with_source_width(self.source_width)
            .with_omit_time(self.omit_time)
            .with_lock_thread(self.lock_thread)
            .with_print_stack_on_switch(self.switch_print == SwitchPrint::Stack)
            .with_print_history_on_switch(self.switch_print == SwitchPrint::History)
            .with_history_limit(self.history_limit)
    }
}
