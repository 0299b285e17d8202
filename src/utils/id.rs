//! Unique identifier generation
//!
//! Conversations and messages carry opaque string ids that must stay unique
//! for the life of the process. Wall-clock timestamps collide on rapid
//! successive calls, so ids come from the system RNG instead, with a
//! monotonic counter standing in if the RNG is ever unavailable.

use std::sync::atomic::{AtomicU64, Ordering};

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Produce a fresh opaque identifier.
pub fn unique_id() -> String {
    match getrandom::u64() {
        Ok(value) => format!("{value:016x}"),
        Err(_) => format!("seq-{:012x}", FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed)),
    }
}
