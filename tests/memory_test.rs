/*!
 * Heap Sampling Tests
 * Allocator accounting behind memoryUsage(), with the tracker installed
 */

use script_host::{HeapStats, TrackingAllocator};
use std::alloc::System;

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator::new(System);

#[test]
fn tracking_allocator_feeds_heap_samples() {
    let live = vec![0u8; 1 << 20];

    let sample = HeapStats::sample();
    assert!(sample.heap_used >= (1 << 20));
    assert!(sample.heap_total >= sample.heap_used);

    drop(live);
    let after = HeapStats::sample();
    assert!(after.heap_total >= after.heap_used);
}
