use embedded_hal::blocking::delay::DelayUs;

/// Time source the driver needs from the platform: a millisecond clock
/// for the poll bound and a busy delay for post-transfer delays.
pub trait Timer: DelayUs<u32> {
    fn now_ms(&self) -> u64;
}

/// Deadline helper for the bounded BUSY wait.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at_ms: u64,
}

impl Deadline {
    pub fn after<T: Timer>(timer: &T, timeout_ms: u64) -> Self {
        Self {
            at_ms: timer.now_ms().saturating_add(timeout_ms),
        }
    }

    pub fn expired<T: Timer>(&self, timer: &T) -> bool {
        timer.now_ms() > self.at_ms
    }
}
