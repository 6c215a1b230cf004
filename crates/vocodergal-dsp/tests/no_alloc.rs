//! Verifies that block processing never touches the allocator.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use vocodergal_dsp::{ProcessorConfig, VocoderProcessor};

struct CountingAllocator;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static TRACKING: Cell<bool> = const { Cell::new(false) };
}

fn record() {
    if TRACKING.with(Cell::get) {
        ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    }
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record();
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record();
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[test]
fn process_does_not_allocate() {
    let config = ProcessorConfig {
        echo: 0.5,
        tremolo: 0.5,
        vibrato: 0.5,
        ..Default::default()
    };
    let mut vocoder = VocoderProcessor::new(config, 48_000.0).unwrap();
    let input: Vec<f32> = (0..256).map(|i| ((i as f32) * 0.13).sin()).collect();
    let carrier: Vec<f32> = (0..256).map(|i| ((i as f32) * 0.05).cos()).collect();
    let mut output = vec![0.0f32; 256];
    let controls = vocoder.controls().clone();

    TRACKING.with(|t| t.set(true));
    for cycle in 0..64 {
        controls.set_pitch(100.0 + cycle as f32);
        controls.set_waveform(cycle % 4);
        let external = (cycle % 2 == 0).then_some(carrier.as_slice());
        vocoder.process(&input, external, &mut output);
    }
    TRACKING.with(|t| t.set(false));

    assert_eq!(ALLOCATIONS.load(Ordering::Relaxed), 0);
}
