use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

// Change counts are never negative, so this cannot collide with a real one.
const UNSET: i64 = i64::MIN;

/// Change count expected right after our own clipboard write.
///
/// The paste executor sets it before writing; the observer consumes it on the
/// poll that sees exactly that count. Clones share the same slot.
#[derive(Debug, Clone)]
pub struct CoordinationToken {
    expected: Arc<AtomicI64>,
}

impl CoordinationToken {
    pub fn new() -> Self {
        Self {
            expected: Arc::new(AtomicI64::new(UNSET)),
        }
    }

    /// Replaces any earlier expectation.
    pub fn expect(&self, change_count: i64) {
        self.expected.store(change_count, Ordering::SeqCst);
    }

    pub fn expected(&self) -> Option<i64> {
        match self.expected.load(Ordering::SeqCst) {
            UNSET => None,
            count => Some(count),
        }
    }

    pub fn clear(&self) {
        self.expected.store(UNSET, Ordering::SeqCst);
    }

    /// Clears the token and returns true when `change_count` is the expected
    /// value; leaves it untouched otherwise.
    pub fn consume(&self, change_count: i64) -> bool {
        change_count != UNSET
            && self
                .expected
                .compare_exchange(change_count, UNSET, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
    }
}

impl Default for CoordinationToken {
    fn default() -> Self {
        Self::new()
    }
}
