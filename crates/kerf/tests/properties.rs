//! Property tests over random allocate/deallocate interleavings.
//!
//! These drive the pool through arbitrary operation sequences and check
//! the structural properties that must hold in every reachable state:
//! pairwise-identical sentinels, complete partition, no adjacent free
//! blocks, deterministic first-fit placement, and byte-for-byte
//! allocate/deallocate round trips.

use kerf::{BlockPtr, Pool, BLOCK_OVERHEAD, SENTINEL_BYTES};
use proptest::prelude::*;

const CAPACITY: usize = 512;

/// Walk the partition through the public sentinel view, returning each
/// block as `(leading offset, raw sentinel)`.
fn walk(pool: &Pool<u64>) -> Vec<(usize, i32)> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    while cursor < pool.capacity() {
        let raw = pool.sentinel_at(cursor).expect("sentinel in bounds");
        assert_ne!(raw, 0, "zero sentinel at {cursor}");
        blocks.push((cursor, raw));
        cursor += raw.unsigned_abs() as usize + BLOCK_OVERHEAD;
    }
    assert_eq!(cursor, pool.capacity(), "partition must land on the end");
    blocks
}

/// Drive a pool through an op sequence, tracking live allocations.
fn run_ops(pool: &mut Pool<u64>, ops: &[(bool, isize)]) -> Vec<(BlockPtr, isize)> {
    let mut live = Vec::new();
    for &(free, count) in ops {
        if free && !live.is_empty() {
            let (ptr, n) = live.remove(count as usize % live.len());
            pool.deallocate(ptr, n).unwrap();
        } else if let Ok(Some(ptr)) = pool.allocate(count) {
            live.push((ptr, count));
        }
    }
    live
}

fn op_seq() -> impl Strategy<Value = Vec<(bool, isize)>> {
    proptest::collection::vec((any::<bool>(), 1isize..12), 0..80)
}

proptest! {
    /// Every block's two sentinels agree in every reachable state.
    #[test]
    fn sentinels_are_pairwise_identical(ops in op_seq()) {
        let mut pool = Pool::<u64>::new(CAPACITY).unwrap();
        run_ops(&mut pool, &ops);
        for (offset, raw) in walk(&pool) {
            let trailer = offset + SENTINEL_BYTES + raw.unsigned_abs() as usize;
            prop_assert_eq!(pool.sentinel_at(trailer), Some(raw));
        }
        prop_assert_eq!(pool.audit(), Ok(()));
    }

    /// No two adjacent blocks are both free after any deallocate.
    #[test]
    fn no_adjacent_free_blocks(ops in op_seq()) {
        let mut pool = Pool::<u64>::new(CAPACITY).unwrap();
        let live = run_ops(&mut pool, &ops);
        for (ptr, n) in live {
            pool.deallocate(ptr, n).unwrap();
            let raws: Vec<i32> = walk(&pool).into_iter().map(|(_, raw)| raw).collect();
            for pair in raws.windows(2) {
                prop_assert!(
                    pair[0] < 0 || pair[1] < 0,
                    "adjacent free blocks: {:?}",
                    pair
                );
            }
        }
        // Everything freed: back to one block spanning the arena.
        prop_assert_eq!(pool.block_count(), 1);
        prop_assert_eq!(pool.free_bytes(), CAPACITY - BLOCK_OVERHEAD);
    }

    /// With no intervening deallocate, block placement is a function of
    /// the request sizes alone.
    #[test]
    fn first_fit_is_deterministic(counts in proptest::collection::vec(1isize..12, 1..20)) {
        let mut a = Pool::<u64>::new(CAPACITY).unwrap();
        let mut b = Pool::<u64>::new(CAPACITY).unwrap();
        for &count in &counts {
            let pa = a.allocate(count).map(|p| p.map(|p| p.offset()));
            let pb = b.allocate(count).map(|p| p.map(|p| p.offset()));
            prop_assert_eq!(pa, pb);
        }
    }

    /// allocate(n) then deallocate restores the buffer byte for byte,
    /// from any reachable prior state.
    #[test]
    fn allocate_deallocate_round_trips(ops in op_seq(), count in 1isize..12) {
        let mut pool = Pool::<u64>::new(CAPACITY).unwrap();
        run_ops(&mut pool, &ops);
        let before = pool.as_bytes().to_vec();
        if let Ok(Some(ptr)) = pool.allocate(count) {
            pool.deallocate(ptr, count).unwrap();
            prop_assert_eq!(pool.as_bytes(), &before[..]);
        } else {
            prop_assert_eq!(pool.as_bytes(), &before[..]);
        }
    }

    /// Total payload handed out can never exceed what the arena holds;
    /// over-asking always fails without corrupting the partition.
    #[test]
    fn exhaustion_is_an_error_not_a_bad_pointer(counts in proptest::collection::vec(1isize..32, 1..40)) {
        let mut pool = Pool::<u64>::new(CAPACITY).unwrap();
        let mut granted = 0usize;
        for count in counts {
            match pool.allocate(count) {
                Ok(Some(ptr)) => {
                    // Payload as reported by the sentinel, slack included.
                    let raw = pool
                        .sentinel_at(ptr.offset() as usize - SENTINEL_BYTES)
                        .unwrap();
                    prop_assert!(raw < 0);
                    granted += raw.unsigned_abs() as usize + BLOCK_OVERHEAD;
                    prop_assert!(granted <= CAPACITY);
                }
                Ok(None) => unreachable!("counts are nonzero"),
                Err(_) => {
                    prop_assert!(pool.largest_free() < count as usize * 8);
                }
            }
            prop_assert_eq!(pool.audit(), Ok(()));
        }
    }
}
