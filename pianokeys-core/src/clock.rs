use std::time::{Duration, Instant};

/// Source of time for the schedulers and the pause debounce. Swapped out in
/// tests so a multi-second song plays instantly.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration);
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
