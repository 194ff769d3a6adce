/*!
 * Tick Queue Property Tests
 * FIFO ordering holds for arbitrary re-entrant enqueue shapes
 */

use parking_lot::Mutex;
use proptest::prelude::*;
use script_host::TickQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

proptest! {
    /// Every callback enqueued before the drain runs in enqueue order, and
    /// every callback spawned mid-drain runs afterwards, in its parent's
    /// order.
    #[test]
    fn drain_preserves_fifo_under_reentrancy(spawns in proptest::collection::vec(any::<bool>(), 0..24)) {
        let queue = Arc::new(TickQueue::new());
        let order = Arc::new(Mutex::new(Vec::new()));
        let next_id = Arc::new(AtomicUsize::new(spawns.len()));

        for (id, spawns_child) in spawns.iter().copied().enumerate() {
            let queue_inner = Arc::clone(&queue);
            let order_outer = Arc::clone(&order);
            let next_id = Arc::clone(&next_id);
            queue.push(Box::new(move || {
                order_outer.lock().push(id);
                if spawns_child {
                    let child_id = next_id.fetch_add(1, Ordering::Relaxed);
                    let order_nested = Arc::clone(&order_outer);
                    queue_inner.push(Box::new(move || {
                        order_nested.lock().push(child_id);
                        Ok(())
                    }));
                }
                Ok(())
            }));
        }

        let children = spawns.iter().filter(|s| **s).count();
        prop_assert_eq!(queue.drain().unwrap(), spawns.len() + children);

        let mut expected: Vec<usize> = (0..spawns.len()).collect();
        expected.extend(spawns.len()..spawns.len() + children);
        prop_assert_eq!(&*order.lock(), &expected);
    }
}
