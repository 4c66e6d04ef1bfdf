#![no_main]

use libfuzzer_sys::fuzz_target;
use stackecho::message::render;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any format string renders without panicking, with or without values
        let _ = render::<&str>(input, &[]);
        let _ = render(input, &["a", "b"]);
    }
});
