//! Internal recorder.
//!
//! Captured microphone samples travel from the callback to the control side
//! through a single-producer single-consumer ring sized to the full take, so
//! the callback never waits and never allocates.
//!
//! Takes are numbered. The control side starts and ends takes by swapping a
//! single status word holding the take number and its phase; the callback
//! only ever ends the take it read at the top of the block, and it records
//! the ring position where each take begins. Samples pushed for an older
//! take are skipped when a newer one is collected.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

const IDLE: u64 = 0;
const RECORDING: u64 = 1;
// The callback ended the take because it filled.
const PENDING: u64 = 2;
const PHASE_MASK: u64 = 0b11;

#[inline]
fn phase(word: u64) -> u64 {
    word & PHASE_MASK
}

#[inline]
fn take_of(word: u64) -> u64 {
    word >> 2
}

#[inline]
fn status(take: u64, phase: u64) -> u64 {
    (take << 2) | phase
}

#[derive(Debug)]
struct RecordingState {
    capacity: usize,
    status: AtomicU64,
    // Take the callback last started, and the push count where it began.
    active_take: AtomicU64,
    take_begin: AtomicUsize,
    captured: AtomicUsize,
}

/// Creates the two halves of a recorder holding up to `capacity` samples.
///
/// The ring has `slack` extra slots for a block pushed by the callback while
/// a take was being restarted.
pub fn recorder(capacity: usize, slack: usize) -> (RecorderInput, RecorderOutput) {
    let capacity = capacity.max(1);
    let (producer, consumer) = HeapRb::<f32>::new(capacity + slack).split();
    let state = Arc::new(RecordingState {
        capacity,
        status: AtomicU64::new(status(0, IDLE)),
        active_take: AtomicU64::new(u64::MAX),
        take_begin: AtomicUsize::new(0),
        captured: AtomicUsize::new(0),
    });
    (
        RecorderInput {
            producer,
            state: Arc::clone(&state),
            take: None,
            captured: 0,
            pushed: 0,
        },
        RecorderOutput {
            collector: Mutex::new(Collector {
                consumer,
                popped: 0,
            }),
            state,
        },
    )
}

/// Callback half: appends samples while a take is running.
pub struct RecorderInput {
    producer: HeapProd<f32>,
    state: Arc<RecordingState>,
    take: Option<u64>,
    captured: usize,
    // Samples ever pushed into the ring.
    pushed: usize,
}

impl RecorderInput {
    /// Whether a take is running.
    #[inline]
    pub fn is_recording(&self) -> bool {
        phase(self.state.status.load(Ordering::Acquire)) == RECORDING
    }

    /// Appends as much of `samples` as fits. Ends the take when full.
    #[inline]
    pub fn capture(&mut self, samples: &[f32]) {
        let word = self.state.status.load(Ordering::Acquire);
        self.capture_for(word, samples);
    }

    /// Appends `samples` to the take described by the status `word`.
    fn capture_for(&mut self, word: u64, samples: &[f32]) {
        if phase(word) != RECORDING {
            return;
        }
        let take = take_of(word);
        let state = &*self.state;
        if self.take != Some(take) {
            self.take = Some(take);
            self.captured = 0;
            state.captured.store(0, Ordering::Relaxed);
            state.take_begin.store(self.pushed, Ordering::Relaxed);
            state.active_take.store(take, Ordering::Release);
        }

        let room = state.capacity.saturating_sub(self.captured);
        let wanted = samples.len().min(room);
        let pushed = self.producer.push_slice(&samples[..wanted]);
        self.pushed += pushed;
        self.captured += pushed;
        state.captured.store(self.captured, Ordering::Relaxed);

        if self.captured >= state.capacity || pushed < wanted {
            // Fails if the take was stopped or replaced meanwhile.
            let _ = state.status.compare_exchange(
                word,
                status(take, PENDING),
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }
}

struct Collector {
    consumer: HeapCons<f32>,
    // Samples ever removed from the ring.
    popped: usize,
}

/// Control half: starts takes and collects finished ones.
pub struct RecorderOutput {
    collector: Mutex<Collector>,
    state: Arc<RecordingState>,
}

impl std::fmt::Debug for RecorderOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderOutput")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RecorderOutput {
    fn lock(&self) -> std::sync::MutexGuard<'_, Collector> {
        self.collector.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    /// Whether a take is running.
    pub fn is_recording(&self) -> bool {
        phase(self.state.status.load(Ordering::Acquire)) == RECORDING
    }

    /// Whether an automatically ended take is waiting to be collected.
    pub fn has_pending_take(&self) -> bool {
        phase(self.state.status.load(Ordering::Acquire)) == PENDING
    }

    /// Samples captured in the current or last take.
    pub fn captured(&self) -> usize {
        let take = take_of(self.state.status.load(Ordering::Acquire));
        if self.state.active_take.load(Ordering::Acquire) == take {
            self.state.captured.load(Ordering::Relaxed)
        } else {
            0
        }
    }

    /// Starts a take, discarding anything not yet collected.
    ///
    /// Returns `false` if a take was already running.
    pub fn start(&self) -> bool {
        let mut collector = self.lock();
        let word = self.state.status.load(Ordering::Acquire);
        if phase(word) == RECORDING {
            return false;
        }
        let dropped = collector.consumer.clear();
        collector.popped += dropped;
        // The callback only moves the status out of RECORDING, so a plain
        // store cannot lose one of its updates here.
        self.state
            .status
            .store(status(take_of(word) + 1, RECORDING), Ordering::Release);
        true
    }

    /// Ends the running take, or collects one the callback ended, and returns
    /// its samples. Returns `None` when there was nothing to end.
    pub fn stop(&self) -> Option<Vec<f32>> {
        let mut collector = self.lock();
        let take = {
            let mut word = self.state.status.load(Ordering::Acquire);
            loop {
                if phase(word) == IDLE {
                    return None;
                }
                match self.state.status.compare_exchange_weak(
                    word,
                    status(take_of(word), IDLE),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => break take_of(word),
                    Err(current) => word = current,
                }
            }
        };

        let popped_before = collector.popped;
        let mut samples = vec![0.0; collector.consumer.occupied_len()];
        let read = collector.consumer.pop_slice(&mut samples);
        samples.truncate(read);
        collector.popped += read;

        // Nothing pushed for this take yet means everything queued is stale.
        let stale = if self.state.active_take.load(Ordering::Acquire) == take {
            self.state
                .take_begin
                .load(Ordering::Relaxed)
                .saturating_sub(popped_before)
        } else {
            read
        };
        samples.drain(..stale.min(read));
        Some(samples)
    }
}
