//! Stack diffing
//!
//! Finds the most recent frame two call stacks have in common so the tracer
//! only prints the frames entered since the previous `trace` call.

use crate::frame::FrameInfo;

/// Returns the indices in `older` and `newer` of the latest (lowest index)
/// stack frame common to both, except that they will never both be 0 when
/// both stacks are non-empty.
///
/// Stacks are ordered innermost first. Post-conditions:
///
/// - `older[older_idx..].len() == newer[newer_idx..].len()`
/// - `older[older_idx + i].same(&newer[newer_idx + i])` for every `i` in range
/// - `(older_idx, newer_idx) != (0, 0)` unless one stack is empty
///
/// Refusing `(0, 0)` means two consecutive calls from the same frame still
/// report the innermost frame as new.
pub fn find_last_common_frame_index(older: &[FrameInfo], newer: &[FrameInfo]) -> (usize, usize) {
    let older_len = older.len();
    let newer_len = newer.len();

    // The latest common frame can only be within the equal-length tails.
    let (mut older_idx, mut newer_idx) = if older_len > newer_len {
        (older_len - newer_len, 0)
    } else {
        (0, newer_len - older_len)
    };

    if older_idx == 0 && newer_idx == 0 && older_len > 0 {
        older_idx = 1;
        newer_idx = 1;
    }

    while older_idx < older_len {
        match first_mismatch(&older[older_idx..], &newer[newer_idx..]) {
            None => break,
            Some(offset) => {
                older_idx += offset + 1;
                newer_idx += offset + 1;
            }
        }
    }

    (older_idx, newer_idx)
}

/// Offset of the first pair of frames that are not at the same location.
fn first_mismatch(older: &[FrameInfo], newer: &[FrameInfo]) -> Option<usize> {
    older
        .iter()
        .zip(newer)
        .position(|(old, new)| !old.same(new))
}
