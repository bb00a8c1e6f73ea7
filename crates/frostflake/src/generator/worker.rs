use core::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    generator::{Error, Mutex, Result},
    id::SnowflakeId,
    time::TimeSource,
};

/// Mutable generation state, guarded as a single unit.
///
/// `last_timestamp` and `sequence` are only ever read-modify-written together
/// under the worker's lock.
#[derive(Debug)]
struct WorkerState {
    last_timestamp: u64,
    sequence: u64,
}

/// A lock-based Snowflake ID worker suitable for multi-threaded environments.
///
/// One worker is typically constructed per process at startup and shared (via
/// `Arc` or a borrowed reference) with every component that needs IDs. The
/// `(datacenter_id, worker_id)` pair is assigned externally and must be unique
/// among all workers sharing the same epoch; the worker itself performs no
/// discovery or coordination.
///
/// ## Guarantees
/// - IDs from a single worker are strictly increasing.
/// - IDs from workers with distinct `(datacenter_id, worker_id)` pairs never
///   collide.
/// - Throughput is bounded to 4096 IDs per millisecond per worker; when the
///   budget is exhausted the call spins until the next millisecond rather than
///   failing.
///
/// ## Example
/// ```
/// use frostflake::{IdWorker, SystemClock};
///
/// let worker = IdWorker::new(0, 0, SystemClock::default()).unwrap();
/// let id = worker.next_id().unwrap();
/// assert_eq!(id.worker_id(), 0);
/// ```
#[derive(Debug)]
pub struct IdWorker<T>
where
    T: TimeSource,
{
    datacenter_id: u64,
    worker_id: u64,
    state: Mutex<WorkerState>,
    time: T,
}

impl<T> IdWorker<T>
where
    T: TimeSource,
{
    /// Creates a new [`IdWorker`] for the given node identifiers.
    ///
    /// # Parameters
    ///
    /// - `worker_id`: identifier of this machine/process within its
    ///   datacenter, `0..=31`.
    /// - `datacenter_id`: identifier of this node's cluster/region, `0..=31`.
    /// - `time`: a [`TimeSource`] (e.g. [`SystemClock`]) that reports
    ///   milliseconds since the deployment's fixed epoch.
    ///
    /// Both identifiers are validated once, here; generation never
    /// re-validates them. The initial `last_timestamp` and `sequence` are
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] or [`Error::InvalidDatacenterId`]
    /// if the corresponding identifier exceeds the 5-bit field maximum of 31.
    /// A worker that fails construction must not be used at all.
    ///
    /// [`SystemClock`]: crate::SystemClock
    pub fn new(worker_id: u64, datacenter_id: u64, time: T) -> Result<Self> {
        Self::from_components(worker_id, datacenter_id, 0, 0, time)
    }

    /// Creates a new [`IdWorker`] with explicit initial generation state.
    ///
    /// This constructor is primarily useful for tests and for restoring a
    /// worker whose high-water timestamp is known (e.g. after reading back the
    /// most recently issued ID). In typical use, prefer [`Self::new`].
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::new`].
    pub fn from_components(
        worker_id: u64,
        datacenter_id: u64,
        last_timestamp: u64,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        if worker_id > SnowflakeId::max_worker_id() {
            return Err(Error::InvalidWorkerId(worker_id));
        }
        if datacenter_id > SnowflakeId::max_datacenter_id() {
            return Err(Error::InvalidDatacenterId(datacenter_id));
        }
        Ok(Self {
            datacenter_id,
            worker_id,
            state: Mutex::new(WorkerState {
                last_timestamp,
                sequence,
            }),
            time,
        })
    }

    /// Returns the worker identifier encoded into every generated ID.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Returns the datacenter identifier encoded into every generated ID.
    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// Generates the next ID.
    ///
    /// Reads the clock and advances `(last_timestamp, sequence)` under the
    /// worker's lock:
    ///
    /// - If the millisecond advanced, the sequence resets to zero.
    /// - Within the same millisecond, the sequence increments. When the
    ///   4096-ID budget for the millisecond is exhausted, the call spins
    ///   (re-reading the clock) until the next millisecond while still holding
    ///   the lock; contending callers queue behind it. Exhaustion is never
    ///   surfaced as an error.
    /// - If the clock reads *earlier* than the last issued timestamp, the call
    ///   fails with [`Error::ClockRegression`] and leaves state unchanged. The
    ///   caller decides whether to wait, retry, or abort; a later call with an
    ///   advancing clock succeeds normally.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] as described above.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (only without the `parking-lot` feature).
    ///
    /// # Example
    /// ```
    /// use frostflake::{IdWorker, SystemClock};
    ///
    /// let worker = IdWorker::new(3, 1, SystemClock::default()).unwrap();
    ///
    /// let a = worker.next_id().unwrap();
    /// let b = worker.next_id().unwrap();
    /// assert!(a < b);
    /// assert_eq!(b.datacenter_id(), 1);
    /// assert_eq!(b.worker_id(), 3);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let mut now = self.time.current_millis();
        match now.cmp(&state.last_timestamp) {
            Ordering::Equal => {
                state.sequence = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
                if state.sequence == 0 {
                    now = self.spin_until_next_millis(state.last_timestamp);
                }
            }
            Ordering::Greater => {
                state.sequence = 0;
            }
            Ordering::Less => {
                return Err(Self::cold_clock_behind(now, state.last_timestamp));
            }
        }

        state.last_timestamp = now;
        Ok(SnowflakeId::from_parts(
            now,
            self.datacenter_id,
            self.worker_id,
            state.sequence,
        ))
    }

    /// Spins until the clock advances strictly past `last`.
    ///
    /// Runs while the caller holds the lock: queued callers wait here too,
    /// which bounds the worker to exactly 4096 IDs per millisecond. The wait
    /// is sub-millisecond by construction.
    #[cold]
    #[inline(never)]
    fn spin_until_next_millis(&self, last: u64) -> u64 {
        loop {
            let now = self.time.current_millis();
            if now > last {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        debug_assert!(now < last);
        Error::ClockRegression {
            last_millis: last,
            now_millis: now,
        }
    }
}
