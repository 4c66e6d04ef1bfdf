// Shared helpers for tracer integration tests
//
// Builds tracers backed by synthetic stacks and an in-memory sink, so output
// is deterministic regardless of how the test binary was compiled.

#![allow(dead_code)]

use stackecho::{MemorySink, SyntheticCapture, Tracer, TracerConfig};

/// Tracer with synthetic stacks, no timestamps and no location column
pub fn synthetic_tracer(config: TracerConfig) -> (Tracer, SyntheticCapture, MemorySink) {
    let sink = MemorySink::new();
    let capture = SyntheticCapture::new();
    let tracer = Tracer::new(
        config
            .with_sink(sink.clone())
            .with_omit_time(true)
            .with_source_width(0),
    )
    .with_capture(capture.clone());
    tracer.enable(true);
    (tracer, capture, sink)
}

/// Lines that are not thread switch markers
pub fn frame_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !line.contains("thread switched"))
        .cloned()
        .collect()
}

/// Strips callout and indentation from a printed line
pub fn bare(line: &str) -> &str {
    line.trim_start_matches(['+', ' '])
}
