//! Whole-buffer publication for sample data read by the audio callback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

/// A sample buffer that is replaced wholesale, never edited in place.
///
/// The callback loads the current buffer without locking. The buffer it
/// replaced is parked in `retired` until the next publication, so the final
/// release of a large allocation happens on a control thread rather than in
/// the callback.
#[derive(Debug)]
pub struct SampleSlot {
    current: ArcSwap<Vec<f32>>,
    retired: Mutex<Option<Arc<Vec<f32>>>>,
}

impl Default for SampleSlot {
    fn default() -> Self {
        Self {
            current: ArcSwap::from_pointee(Vec::new()),
            retired: Mutex::new(None),
        }
    }
}

impl SampleSlot {
    /// Replaces the buffer.
    pub fn publish(&self, samples: Vec<f32>) {
        let previous = self.current.swap(Arc::new(samples));
        let mut retired = self.retired.lock().unwrap_or_else(|e| e.into_inner());
        *retired = Some(previous);
    }

    /// Borrows the current buffer. Lock-free.
    #[inline]
    pub fn load(&self) -> arc_swap::Guard<Arc<Vec<f32>>> {
        self.current.load()
    }

    /// Length of the current buffer.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Copy of the current buffer.
    pub fn snapshot(&self) -> Vec<f32> {
        Vec::clone(&self.current.load())
    }
}

/// Read position into a looping [`SampleSlot`].
#[derive(Debug, Default)]
pub struct LoopCursor(AtomicUsize);

impl LoopCursor {
    /// Current position.
    pub fn position(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    /// Rewinds to the start.
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    /// Copies `out.len()` samples from `source` starting at the cursor,
    /// wrapping at the end, and stores the advanced position.
    ///
    /// The stored position is reduced modulo the length first, so a cursor
    /// left over from a longer buffer stays in range.
    #[inline]
    pub fn fill(&self, source: &[f32], out: &mut [f32]) {
        if source.is_empty() {
            out.fill(0.0);
            return;
        }
        let mut index = self.0.load(Ordering::Relaxed) % source.len();
        for slot in out.iter_mut() {
            *slot = source[index];
            index += 1;
            if index == source.len() {
                index = 0;
            }
        }
        self.0.store(index, Ordering::Relaxed);
    }
}
