mod fake;
mod navigator_tests;

pub(crate) use fake::{FakeElement, FakeEngine};

use crate::Clock;
use std::time::Duration;

/// Millisecond clock so missing-element timeouts resolve instantly.
pub(crate) fn test_clock() -> Clock {
    Clock {
        tick: Duration::from_millis(2),
        poll: Duration::from_millis(1),
    }
}
