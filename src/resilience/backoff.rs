//! Retry backoff.

use std::time::Duration;

/// Linear backoff: the delay before retry `retry` (1-indexed) is
/// `base_ms * retry`. Retry 0 is the initial attempt and never waits.
pub fn linear_backoff(retry: u32, base_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(retry)))
}
