/*!
 * Heap Sampling
 * Live-byte accounting behind memoryUsage()
 */

use crate::core::types::HeapSize;
use serde::{Deserialize, Serialize};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Nominal heap size reported when no tracking allocator is installed
const DEFAULT_HEAP_TOTAL: HeapSize = 512 * 1024 * 1024; // 512MB

// Global live-byte tracking, updated by TrackingAllocator
static HEAP_USED: AtomicUsize = AtomicUsize::new(0);
static HEAP_PEAK: AtomicUsize = AtomicUsize::new(0);

/// Heap snapshot in bytes, sampled at call time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapStats {
    pub heap_total: HeapSize,
    pub heap_used: HeapSize,
}

impl HeapStats {
    /// Sample the allocator counters. `heap_total >= heap_used` holds for
    /// every sample: the total is the larger of the nominal size and the
    /// observed peak.
    pub fn sample() -> Self {
        let used = HEAP_USED.load(Ordering::Relaxed) as HeapSize;
        let peak = HEAP_PEAK.load(Ordering::Relaxed) as HeapSize;
        let heap_total = DEFAULT_HEAP_TOTAL.max(peak);
        Self {
            heap_total,
            heap_used: used.min(heap_total),
        }
    }
}

/// Allocator wrapper counting live and peak bytes.
///
/// Hosts install it process-wide:
///
/// ```ignore
/// #[global_allocator]
/// static ALLOC: TrackingAllocator = TrackingAllocator(std::alloc::System);
/// ```
///
/// Without it, `HeapStats::sample()` reports the nominal total with zero
/// used bytes.
pub struct TrackingAllocator<A = System>(pub A);

impl<A> TrackingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self(inner)
    }
}

fn record_alloc(size: usize) {
    let used = HEAP_USED.fetch_add(size, Ordering::Relaxed) + size;
    HEAP_PEAK.fetch_max(used, Ordering::Relaxed);
}

fn record_dealloc(size: usize) {
    HEAP_USED.fetch_sub(size, Ordering::Relaxed);
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.0.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.0.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.0.dealloc(ptr, layout);
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.0.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record_dealloc(layout.size());
            record_alloc(new_size);
        }
        new_ptr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_never_below_used() {
        let stats = HeapStats::sample();
        assert!(stats.heap_total >= stats.heap_used);
    }
}
