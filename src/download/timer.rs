/// Monotonic millisecond source driving every countdown in the download loop.
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Absolute deadline on a [`MonotonicClock`].
///
/// A fresh countdown has its deadline at zero and therefore reports expired
/// as soon as the clock has moved past the first millisecond.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    end_ms: u64,
}

impl Countdown {
    pub const fn new() -> Self {
        Self { end_ms: 0 }
    }

    pub fn countdown_ms(&mut self, now_ms: u64, timeout_ms: u64) {
        self.end_ms = now_ms.saturating_add(timeout_ms);
    }

    pub fn countdown_secs(&mut self, now_ms: u64, timeout_secs: u32) {
        self.countdown_ms(now_ms, u64::from(timeout_secs) * 1_000);
    }

    /// True once the clock is strictly past the deadline.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.end_ms
    }

    pub fn left_ms(&self, now_ms: u64) -> u64 {
        self.end_ms.saturating_sub(now_ms)
    }

    pub fn deadline_ms(&self) -> u64 {
        self.end_ms
    }
}
