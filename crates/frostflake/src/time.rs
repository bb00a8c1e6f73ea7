use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default epoch: Wednesday, May 20, 2020 00:00:00 UTC
///
/// This is the zero-point for the 41-bit timestamp field. It must never change
/// once any ID has been issued against it: moving the epoch breaks the
/// ordering of new IDs relative to stored ones and risks collisions with
/// previously issued values.
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_589_923_200_000);

/// A trait for time sources that return a millisecond timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests.
///
/// The unit is expected to be **milliseconds** relative to a configurable
/// epoch.
///
/// # Example
///
/// ```
/// use frostflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

/// A wall-clock time source anchored to a caller-chosen epoch.
///
/// Each call to [`current_millis`] reads `SystemTime::now()` and subtracts the
/// epoch. The reading deliberately follows the system clock rather than a
/// monotonic timer: an [`IdWorker`] must be able to *observe* a backward step
/// (e.g. an NTP correction) so it can refuse to issue IDs at the wrong logical
/// time instead of silently absorbing it.
///
/// If the system clock reads earlier than the epoch, the reading saturates at
/// zero.
///
/// [`current_millis`]: TimeSource::current_millis
/// [`IdWorker`]: crate::IdWorker
#[derive(Clone, Debug)]
pub struct SystemClock {
    epoch_millis: u64,
}

impl Default for SystemClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// The epoch defines the zero-point for all timestamps returned by this
    /// clock and thereby the timestamp field of every ID generated from it.
    /// Pick it once per deployment and keep it fixed.
    pub fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        now.saturating_sub(self.epoch_millis)
    }
}
