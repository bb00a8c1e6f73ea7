use core::fmt;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `frostflake` can emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Error {
    /// The wall clock was observed earlier than the timestamp of the last
    /// issued ID (e.g. an NTP step correction).
    ///
    /// The generator never retries or self-heals on regression: issuing an ID
    /// would stamp it at the wrong logical time. The caller decides whether to
    /// wait for the clock to catch up, retry, or abort. Worker state is left
    /// untouched.
    ClockRegression {
        /// Timestamp (ms since epoch) of the most recently issued ID.
        last_millis: u64,
        /// The backward reading observed on this call.
        now_millis: u64,
    },

    /// The `worker_id` passed at construction exceeds the 5-bit field maximum
    /// of 31.
    InvalidWorkerId(u64),

    /// The `datacenter_id` passed at construction exceeds the 5-bit field
    /// maximum of 31.
    InvalidDatacenterId(u64),

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg(not(feature = "parking-lot"))]
    LockPoisoned,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ClockRegression {
                last_millis,
                now_millis,
            } => write!(
                fmt,
                "clock moved backwards: observed {now_millis}ms, last issued at {last_millis}ms"
            ),
            Self::InvalidWorkerId(id) => {
                write!(fmt, "worker_id {id} out of range (max 31)")
            }
            Self::InvalidDatacenterId(id) => {
                write!(fmt, "datacenter_id {id} out of range (max 31)")
            }
            #[cfg(not(feature = "parking-lot"))]
            Self::LockPoisoned => write!(fmt, "worker lock poisoned"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
