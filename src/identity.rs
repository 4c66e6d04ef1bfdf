//! Thread identity
//!
//! The tracer keys its per-thread state by a small integer. The default
//! provider hands out ids from a global counter the first time a thread asks
//! for one and caches it in a thread-local, so lookups never allocate or parse.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, TraceError};

/// Source of the calling thread's id
///
/// Implementations must be cheap: the tracer calls this while holding its lock.
pub trait ThreadIdentity: Send + Sync {
    /// Returns a stable, non-zero id for the calling thread.
    fn current_id(&self) -> Result<u64>;
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: Cell<u64> = const { Cell::new(0) };
}

/// Returns the numerical id of the calling thread. Ids start at 1.
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(assign_id)
}

fn assign_id(cell: &Cell<u64>) -> u64 {
    let id = cell.get();
    if id != 0 {
        return id;
    }
    let id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    cell.set(id);
    id
}

/// Default provider backed by [`current_thread_id`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalIdentity;

impl ThreadIdentity for ThreadLocalIdentity {
    fn current_id(&self) -> Result<u64> {
        // Fails only while the thread's locals are being torn down.
        THREAD_ID
            .try_with(assign_id)
            .map_err(|e| TraceError::IdentityUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_id_is_stable_within_thread() {
        let first = current_thread_id();
        let second = current_thread_id();
        assert_eq!(first, second);
        assert_ne!(first, 0);
    }

    #[test]
    fn test_ids_differ_across_threads() {
        let here = current_thread_id();
        let there = thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn test_provider_matches_free_function() {
        let provider = ThreadLocalIdentity;
        assert_eq!(provider.current_id().unwrap(), current_thread_id());
    }
}
