use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use stackecho::{cli::Cli, trace, Tracer, WriterSink};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

#[inline(never)]
fn alice(tracer: &Tracer, n: &str) {
    trace!(tracer => "Alice: [{}]", n);
}

#[inline(never)]
fn barb(tracer: &Tracer, n: &str, rounds: usize) {
    trace!(tracer => "Barb! [{}]", n);
    for _ in 0..rounds {
        thread::sleep(Duration::from_millis(5));
        alice(tracer, &format!("barb {}", n));
    }
    trace!(tracer => "Bob! [{}]", n);
    for _ in 0..rounds {
        thread::sleep(Duration::from_millis(5));
        alice(tracer, &format!("bob {}", n));
    }
    trace!(tracer => "Blaise! [{}]", n);
}

#[inline(never)]
fn carol(tracer: &Tracer, n: &str) {
    trace!(tracer => "Carol before [{}]", n);
    alice(tracer, &format!("carol {}", n));
    trace!(tracer => "Carol after [{}]", n);
}

#[inline(never)]
fn dely(tracer: &Tracer, n: &str, rounds: usize) {
    trace!(tracer => "Dely! [{}]", n);
    for _ in 0..rounds {
        trace!(tracer =>);
    }
    trace!(tracer => "Dan! [{}]", n);
}

/// Runs the demo workload on the main thread and `workers` extra threads.
///
/// With `lock_thread` the tracer is locked to the main thread once it has
/// traced its first line.
fn run_workload(tracer: &Tracer, depth: usize, workers: usize, lock_thread: bool) {
    trace!(tracer => "Start");
    if lock_thread {
        tracer.update_config(|config| config.lock_thread = true);
    }
    carol(tracer, "one");

    thread::scope(|scope| {
        for worker in 0..workers {
            scope.spawn(move || {
                let name = format!("worker {}", worker);
                if worker % 2 == 0 {
                    barb(tracer, &name, depth);
                } else {
                    carol(tracer, &name);
                }
            });
        }
        alice(tracer, "ten");
        dely(tracer, "eleven", depth);
    });

    trace!(tracer => "The end!");
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = args.tracer_config().with_sink(WriterSink::stdout());
    config.validate()?;

    // A tracer locked before its first call traces nothing.
    let lock_thread = config.lock_thread;
    let tracer = Tracer::new(config.with_lock_thread(false));
    tracer.enable(true);
    run_workload(&tracer, args.depth, args.threads, lock_thread);

    if args.json {
        let snapshot: BTreeMap<_, _> = tracer.threads().into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}
