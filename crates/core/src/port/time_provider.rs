// Time Provider Port
// Clock behind the debounce window, swapped for a manual one in tests

/// Wall clock in milliseconds since the Unix epoch
///
/// `ConfigStore::begin_cycle` compares two readings against `wait_time`,
/// so implementations only need to be monotonic enough for that.
pub trait TimeProvider: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Reads the system clock through chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to
    pub struct MockTimeProvider {
        now: AtomicI64,
    }

    impl MockTimeProvider {
        pub fn new(now_millis: i64) -> Self {
            Self {
                now: AtomicI64::new(now_millis),
            }
        }

        pub fn advance_secs(&self, secs: i64) {
            self.now.fetch_add(secs * 1000, Ordering::SeqCst);
        }
    }

    impl TimeProvider for MockTimeProvider {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
