//! Wall-clock source.

use jiff::Timestamp;
use mockall::automock;

/// Source of the current time used for expiry checks and request windows.
#[automock]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
