#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use stackecho::stack_diff::find_last_common_frame_index;
use stackecho::{FrameInfo, Location};

fn stack(bytes: &[u8]) -> Vec<FrameInfo> {
    let at = Utc.timestamp_opt(0, 0).unwrap();
    bytes
        .iter()
        .map(|b| FrameInfo::new(Location::new("f.rs", u32::from(b % 4), 0, "f"), at))
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |b| *b as usize) % (data.len().max(1));
    let (older, newer) = data.split_at(split);
    let older = stack(older);
    let newer = stack(newer);

    let (oi, ni) = find_last_common_frame_index(&older, &newer);
    assert!(oi <= older.len() && ni <= newer.len());
    assert_eq!(older.len() - oi, newer.len() - ni);
    if !older.is_empty() && !newer.is_empty() {
        assert_ne!((oi, ni), (0, 0));
    }
});
