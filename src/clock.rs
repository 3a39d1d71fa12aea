//! Time sources for the playback scheduler

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Output sample rate of every VGM log
pub const SAMPLE_RATE: u32 = 44_100;

/// Whole samples elapsed in `elapsed` at [`SAMPLE_RATE`]
pub fn samples_for(elapsed: Duration) -> u64 {
    let samples = elapsed.as_nanos() * SAMPLE_RATE as u128 / 1_000_000_000;
    u64::try_from(samples).unwrap_or(u64::MAX)
}

/// Shortest duration covering `samples` at [`SAMPLE_RATE`].
///
/// Rounded up, so `samples_for(duration_for(n)) == n`.
pub fn duration_for(samples: u64) -> Duration {
    let rate = SAMPLE_RATE as u128;
    let nanos = (samples as u128 * 1_000_000_000).div_ceil(rate);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Monotonic time source with an arbitrary epoch
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same counter, so a test can keep one handle and give
/// another to the player.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, Ordering::SeqCst);
    }

    /// Advance by `samples` worth of time
    pub fn advance_samples(&self, samples: u64) {
        self.advance(duration_for(samples));
    }

    pub fn set(&self, now: Duration) {
        let now = u64::try_from(now.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
