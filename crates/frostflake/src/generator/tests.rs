use crate::{Error, IdWorker, SnowflakeId, SystemClock, TimeSource};
use core::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::scope;

#[derive(Debug)]
struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn step(&self) {
        self.clock.index.set(self.clock.index.get() + 1);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

/// A deterministic clock that advances one millisecond for every
/// `reads_per_tick` observations.
///
/// This lets the exhaustion spin make forward progress without a real clock:
/// the spin loop's own re-reads eventually tick the time over.
struct TickingTime {
    start: u64,
    reads: AtomicU64,
    reads_per_tick: u64,
}

impl TickingTime {
    fn new(start: u64, reads_per_tick: u64) -> Self {
        Self {
            start,
            reads: AtomicU64::new(0),
            reads_per_tick,
        }
    }
}

impl TimeSource for TickingTime {
    fn current_millis(&self) -> u64 {
        let reads = self.reads.fetch_add(1, Ordering::Relaxed);
        self.start + reads / self.reads_per_tick
    }
}

#[test]
fn sequence_increments_within_same_tick() {
    let worker = IdWorker::new(0, 0, MockTime { millis: 42 }).unwrap();

    let id1 = worker.next_id().unwrap();
    let id2 = worker.next_id().unwrap();
    let id3 = worker.next_id().unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn rollover_resets_sequence_on_next_tick() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let worker = IdWorker::new(1, 1, time.clone()).unwrap();

    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 0);

    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 1);

    time.step();

    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn exhaustion_uses_full_sequence_budget_then_spins_over() {
    // One generation read per call; the 4097th read within the tick trips the
    // wrap, and the spin's next read lands in the following millisecond.
    let worker = IdWorker::new(0, 0, TickingTime::new(42, 4097)).unwrap();

    let ids: Vec<SnowflakeId> = (0..5000).map(|_| worker.next_id().unwrap()).collect();

    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 5000);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let first_tick: Vec<_> = ids.iter().filter(|id| id.timestamp() == 42).collect();
    let second_tick: Vec<_> = ids.iter().filter(|id| id.timestamp() == 43).collect();
    assert_eq!(first_tick.len() + second_tick.len(), 5000);

    // The full 4096-value budget is consumed before rolling into the next
    // millisecond, which then starts back at zero.
    let first_tick_seqs: HashSet<_> = first_tick.iter().map(|id| id.sequence()).collect();
    assert_eq!(first_tick.len(), 4096);
    assert_eq!(first_tick_seqs.len(), 4096);
    assert_eq!(second_tick[0].sequence(), 0);
}

#[test]
fn exhaustion_spin_from_seeded_state() {
    // Seed the worker one increment away from a sequence wrap.
    let worker = IdWorker::from_components(
        0,
        0,
        42,
        SnowflakeId::max_sequence(),
        TickingTime::new(42, 2),
    )
    .unwrap();

    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn clock_regression_errors_and_preserves_state() {
    let time = SharedMockStepTime::new(vec![42, 41, 42, 43]);
    let worker = IdWorker::new(0, 0, time.clone()).unwrap();

    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 0);

    // Clock steps backward: the call fails and must not mutate state.
    time.step();
    let err = worker.next_id().unwrap_err();
    assert_eq!(
        err,
        Error::ClockRegression {
            last_millis: 42,
            now_millis: 41,
        }
    );

    // Back at the last-issued millisecond: the sequence continues from where
    // it left off, proving the failed call touched nothing.
    time.step();
    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 1);

    // And a normally advancing clock resumes as usual.
    time.step();
    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn distinct_workers_never_collide_within_a_millisecond() {
    let a = IdWorker::new(0, 0, MockTime { millis: 42 }).unwrap();
    let b = IdWorker::new(0, 1, MockTime { millis: 42 }).unwrap();
    let c = IdWorker::new(1, 0, MockTime { millis: 42 }).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..100 {
        assert!(seen.insert(a.next_id().unwrap()));
        assert!(seen.insert(b.next_id().unwrap()));
        assert!(seen.insert(c.next_id().unwrap()));
    }
    assert_eq!(seen.len(), 300);
}

#[test]
fn ids_decode_back_to_construction_params() {
    let worker = IdWorker::new(17, 5, MockTime { millis: 1000 }).unwrap();
    assert_eq!(worker.worker_id(), 17);
    assert_eq!(worker.datacenter_id(), 5);

    let id = worker.next_id().unwrap();
    assert_eq!(id.worker_id(), 17);
    assert_eq!(id.datacenter_id(), 5);
    assert_eq!(id.timestamp(), 1000);
    assert_eq!(
        id.to_raw(),
        (1000 << SnowflakeId::TIMESTAMP_SHIFT) | (5 << SnowflakeId::DATACENTER_ID_SHIFT)
            | (17 << SnowflakeId::WORKER_ID_SHIFT)
    );
}

#[test]
fn construction_boundaries() {
    assert!(IdWorker::new(31, 31, MockTime { millis: 0 }).is_ok());
    assert!(IdWorker::new(0, 0, MockTime { millis: 0 }).is_ok());

    let err = IdWorker::new(32, 0, MockTime { millis: 0 }).unwrap_err();
    assert_eq!(err, Error::InvalidWorkerId(32));

    let err = IdWorker::new(0, 32, MockTime { millis: 0 }).unwrap_err();
    assert_eq!(err, Error::InvalidDatacenterId(32));

    let err = IdWorker::from_components(99, 0, 0, 0, MockTime { millis: 0 }).unwrap_err();
    assert_eq!(err, Error::InvalidWorkerId(99));
}

#[test]
fn wall_clock_ids_strictly_increase() {
    let worker = IdWorker::new(1, 1, SystemClock::default()).unwrap();

    let mut last: Option<SnowflakeId> = None;
    for _ in 0..100_000 {
        let id = worker.next_id().unwrap();
        if let Some(prev) = last {
            assert!(id > prev);
        }
        last = Some(id);
    }
}

#[test]
fn threaded_ids_are_unique() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let worker = Arc::new(IdWorker::new(0, 0, SystemClock::default()).unwrap());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let worker = Arc::clone(&worker);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                for _ in 0..IDS_PER_THREAD {
                    let id = worker.next_id().unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}
